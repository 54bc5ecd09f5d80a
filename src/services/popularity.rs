use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::instrument;

use super::{ensure_film, ensure_user, locks::KeyedLocks};
use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{Film, FilmId, UserId},
};

/// Like relation between users and films, with the cached per-film rate.
pub struct PopularityAggregate {
    storage: Arc<dyn Storage>,
    film_locks: KeyedLocks<FilmId>,
}

impl PopularityAggregate {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            film_locks: KeyedLocks::new(),
        }
    }

    /// Records that `user_id` likes `film_id`. A second like is a conflict.
    #[instrument(skip(self))]
    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<u64> {
        ensure_film(self.storage.as_ref(), film_id).await?;
        ensure_user(self.storage.as_ref(), user_id).await?;

        let _guard = self.film_locks.lock(film_id).await;
        let commit = self.storage.insert_like(film_id, user_id).await?;
        if !commit.applied {
            tracing::warn!("Duplicate like rejected");
            return Err(AppError::Conflict(format!(
                "User {} already likes film {}",
                user_id, film_id
            )));
        }

        tracing::info!(rate = commit.rate, "Like added");
        Ok(commit.rate)
    }

    /// Removes the like if present; the rate never drops below zero
    #[instrument(skip(self))]
    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<u64> {
        ensure_film(self.storage.as_ref(), film_id).await?;
        ensure_user(self.storage.as_ref(), user_id).await?;

        let _guard = self.film_locks.lock(film_id).await;
        let commit = self.storage.delete_like(film_id, user_id).await?;
        if commit.applied {
            tracing::info!(rate = commit.rate, "Like removed");
        } else {
            tracing::debug!("No like to remove");
        }
        Ok(commit.rate)
    }

    /// Films ordered by rate, highest first; equal rates keep id order
    #[instrument(skip(self))]
    pub async fn top_films(&self, limit: NonZeroUsize) -> AppResult<Vec<Film>> {
        let films = self.storage.films().await?;
        Ok(rank_by_rate(films, limit.get()))
    }
}

/// Stable sort by descending rate, truncated to `limit`
fn rank_by_rate(mut films: Vec<Film>, limit: usize) -> Vec<Film> {
    films.sort_by_key(|film| film.id);
    films.sort_by(|a, b| b.rate.cmp(&a.rate));
    films.truncate(limit);
    films
}
