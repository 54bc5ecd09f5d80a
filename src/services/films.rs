use std::sync::Arc;

use super::ReferenceService;
use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{Film, FilmDraft, FilmId, FilmPayload},
};

/// Cataloguing and lookup of films.
///
/// Likes and rate are never taken from the request body; they only change
/// through [`crate::services::PopularityAggregate`].
pub struct FilmService {
    storage: Arc<dyn Storage>,
    reference: Arc<ReferenceService>,
}

impl FilmService {
    pub fn new(storage: Arc<dyn Storage>, reference: Arc<ReferenceService>) -> Self {
        Self { storage, reference }
    }

    pub async fn create(&self, payload: FilmPayload) -> AppResult<Film> {
        let draft = self.draft(payload).await?;
        let film = self.storage.insert_film(draft).await?;
        tracing::info!(film_id = %film.id, name = %film.name, "Film created");
        Ok(film)
    }

    pub async fn update(&self, payload: FilmPayload) -> AppResult<Film> {
        let id = payload
            .id
            .ok_or_else(|| AppError::Validation(vec!["id: must be present".to_string()]))?;
        let draft = self.draft(payload).await?;

        let film = self
            .storage
            .update_film(id, draft)
            .await?
            .ok_or_else(|| AppError::film_not_found(id))?;
        tracing::info!(film_id = %id, "Film updated");
        Ok(film)
    }

    pub async fn get(&self, id: FilmId) -> AppResult<Film> {
        self.storage
            .film(id)
            .await?
            .ok_or_else(|| AppError::film_not_found(id))
    }

    pub async fn list(&self) -> AppResult<Vec<Film>> {
        Ok(self.storage.films().await?)
    }

    /// Validates the payload and resolves its MPA rating and genres
    async fn draft(&self, payload: FilmPayload) -> AppResult<FilmDraft> {
        let (release_date, duration) = payload.validate().map_err(AppError::Validation)?;

        let mpa = match payload.mpa {
            Some(reference) => Some(self.reference.mpa_rating(reference.id).await?),
            None => None,
        };
        let mut genres = Vec::new();
        for id in payload.genre_ids() {
            genres.push(self.reference.genre(id).await?);
        }

        Ok(FilmDraft {
            name: payload.name,
            description: payload.description,
            release_date,
            duration,
            mpa,
            genres,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::models::{ReferenceId, UserId};
    use crate::services::PopularityAggregate;
    use chrono::NaiveDate;

    fn services() -> (FilmService, PopularityAggregate, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::with_reference_data());
        let reference = Arc::new(ReferenceService::new(storage.clone()));
        (
            FilmService::new(storage.clone(), reference),
            PopularityAggregate::new(storage.clone()),
            storage,
        )
    }

    fn payload(name: &str) -> FilmPayload {
        FilmPayload {
            id: None,
            name: name.to_string(),
            description: "Heist drama".to_string(),
            release_date: NaiveDate::from_ymd_opt(1995, 12, 15),
            duration: Some(170),
            mpa: Some(ReferenceId { id: 4 }),
            genres: vec![ReferenceId { id: 6 }, ReferenceId { id: 2 }],
        }
    }

    #[tokio::test]
    async fn test_create_resolves_references() {
        let (films, _, _) = services();
        let film = films.create(payload("Heat")).await.unwrap();

        assert_eq!(film.mpa.as_ref().map(|m| m.name.as_str()), Some("R"));
        let genres: Vec<&str> = film.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres, vec!["Drama", "Action"]);
        assert_eq!(film.rate, 0);
    }

    #[tokio::test]
    async fn test_unknown_reference_is_not_found() {
        let (films, _, _) = services();
        let mut film = payload("Heat");
        film.mpa = Some(ReferenceId { id: 99 });
        assert!(matches!(
            films.create(film).await,
            Err(AppError::NotFound(_))
        ));

        let mut film = payload("Heat");
        film.genres = vec![ReferenceId { id: 99 }];
        assert!(matches!(
            films.create(film).await,
            Err(AppError::NotFound(_))
        ));
        assert!(films.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_likes_and_rate() {
        let (films, popularity, storage) = services();
        let film = films.create(payload("Heat")).await.unwrap();
        let user = crate::services::test_support::add_user(storage.as_ref(), "ann").await;
        popularity.add_like(film.id, user).await.unwrap();

        let mut update = payload("Heat (Director's Cut)");
        update.id = Some(film.id);
        let updated = films.update(update).await.unwrap();

        assert_eq!(updated.name, "Heat (Director's Cut)");
        assert_eq!(updated.rate, 1);
        assert!(updated.likes.contains(&UserId(1)));
    }

    #[tokio::test]
    async fn test_update_unknown_film() {
        let (films, _, _) = services();
        let mut update = payload("Heat");
        update.id = Some(FilmId(8));
        assert!(matches!(
            films.update(update).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (films, _, _) = services();
        let mut film = payload("");
        film.duration = Some(-5);
        match films.create(film).await {
            Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
