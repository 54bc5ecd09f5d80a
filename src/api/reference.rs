use axum::{extract::State, Json};

use super::{extract::AppPath, AppState};
use crate::{
    error::AppResult,
    models::{Genre, MpaRating},
};

pub async fn list_mpa(State(state): State<AppState>) -> AppResult<Json<Vec<MpaRating>>> {
    Ok(Json(state.reference.mpa_ratings().await?))
}

pub async fn get_mpa(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> AppResult<Json<MpaRating>> {
    Ok(Json(state.reference.mpa_rating(id).await?))
}

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.reference.genres().await?))
}

pub async fn get_genre(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.reference.genre(id).await?))
}
