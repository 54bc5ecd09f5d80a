use std::num::NonZeroUsize;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{
    extract::{AppJson, AppPath, AppQuery},
    AppState,
};
use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Film, FilmId, FilmPayload, UserId},
};

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    count: Option<i64>,
}

/// Add a film to the catalog
pub async fn create_film(
    State(state): State<AppState>,
    AppJson(payload): AppJson<FilmPayload>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.films.create(payload).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// Replace a film's descriptive fields
pub async fn update_film(
    State(state): State<AppState>,
    AppJson(payload): AppJson<FilmPayload>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.update(payload).await?))
}

pub async fn get_film(
    State(state): State<AppState>,
    AppPath(id): AppPath<FilmId>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.get(id).await?))
}

pub async fn list_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.list().await?))
}

pub async fn add_like(
    State(state): State<AppState>,
    request_id: RequestId,
    AppPath((id, user_id)): AppPath<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        film_id = %id,
        user_id = %user_id,
        "Processing like"
    );
    state.popularity.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_like(
    State(state): State<AppState>,
    request_id: RequestId,
    AppPath((id, user_id)): AppPath<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        film_id = %id,
        user_id = %user_id,
        "Processing like removal"
    );
    state.popularity.remove_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Most liked films; `count` defaults to the configured value
pub async fn popular_films(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let limit = match query.count {
        Some(count) => usize::try_from(count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| AppError::InvalidInput("count must be at least 1".to_string()))?,
        None => state.config.popular_default_count,
    };

    tracing::info!(count = limit.get(), "Fetching popular films");
    Ok(Json(state.popularity.top_films(limit).await?))
}
