use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{FilmId, UserId},
};

pub mod films;
pub mod friendship;
pub mod locks;
pub mod popularity;
pub mod reference;
pub mod users;

pub use films::FilmService;
pub use friendship::FriendshipGraph;
pub use popularity::PopularityAggregate;
pub use reference::ReferenceService;
pub use users::UserService;

/// Fails with `NotFound` naming the id when the user is not registered
pub(crate) async fn ensure_user(storage: &dyn Storage, id: UserId) -> AppResult<()> {
    if storage.user_exists(id).await? {
        Ok(())
    } else {
        tracing::warn!(user_id = %id, "Referenced user does not exist");
        Err(AppError::user_not_found(id))
    }
}

/// Fails with `NotFound` naming the id when the film is not catalogued
pub(crate) async fn ensure_film(storage: &dyn Storage, id: FilmId) -> AppResult<()> {
    if storage.film_exists(id).await? {
        Ok(())
    } else {
        tracing::warn!(film_id = %id, "Referenced film does not exist");
        Err(AppError::film_not_found(id))
    }
}
