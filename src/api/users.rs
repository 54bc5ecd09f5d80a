use axum::{extract::State, http::StatusCode, Json};

use super::{
    extract::{AppJson, AppPath},
    AppState,
};
use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{User, UserId, UserPayload},
};

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserPayload>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace an existing user's fields
pub async fn update_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserPayload>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update(payload).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// Send a friend request, or confirm the one already received
pub async fn add_friend(
    State(state): State<AppState>,
    request_id: RequestId,
    AppPath((id, friend_id)): AppPath<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        user_id = %id,
        friend_id = %friend_id,
        "Processing friend request"
    );
    state.friendships.request_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

/// Cancel a friend request or unfriend
pub async fn remove_friend(
    State(state): State<AppState>,
    request_id: RequestId,
    AppPath((id, friend_id)): AppPath<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    tracing::info!(
        request_id = %request_id,
        user_id = %id,
        friend_id = %friend_id,
        "Processing friend removal"
    );
    state.friendships.remove_friend(id, friend_id).await?;
    Ok(StatusCode::OK)
}

pub async fn get_friends(
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
) -> AppResult<Json<Vec<User>>> {
    let ids = state.friendships.friends(id).await?;
    Ok(Json(state.users.resolve(ids).await?))
}

pub async fn get_common_friends(
    State(state): State<AppState>,
    AppPath((id, other_id)): AppPath<(UserId, UserId)>,
) -> AppResult<Json<Vec<User>>> {
    let ids = state.friendships.mutual_friends(id, other_id).await?;
    Ok(Json(state.users.resolve(ids).await?))
}
