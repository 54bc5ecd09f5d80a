use axum::{
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{films, reference, users, AppState};
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users and friendships
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user),
        )
        .route("/users/:id", get(users::get_user))
        .route("/users/:id/friends", get(users::get_friends))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend).delete(users::remove_friend),
        )
        .route(
            "/users/:id/friends/common/:other_id",
            get(users::get_common_friends),
        )
        // Films and likes
        .route(
            "/films",
            get(films::list_films)
                .post(films::create_film)
                .put(films::update_film),
        )
        .route("/films/popular", get(films::popular_films))
        .route("/films/:id", get(films::get_film))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like).delete(films::remove_like),
        )
        // Reference data
        .route("/mpa", get(reference::list_mpa))
        .route("/mpa/:id", get(reference::get_mpa))
        .route("/genres", get(reference::list_genres))
        .route("/genres/:id", get(reference::get_genre))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
