use std::sync::Arc;

use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{Genre, MpaRating},
};

/// Read-only access to MPA ratings and genres
pub struct ReferenceService {
    storage: Arc<dyn Storage>,
}

impl ReferenceService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn mpa_ratings(&self) -> AppResult<Vec<MpaRating>> {
        Ok(self.storage.mpa_ratings().await?)
    }

    pub async fn mpa_rating(&self, id: u32) -> AppResult<MpaRating> {
        self.storage
            .mpa_rating(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("MPA rating with id {} not found", id)))
    }

    pub async fn genres(&self) -> AppResult<Vec<Genre>> {
        Ok(self.storage.genres().await?)
    }

    pub async fn genre(&self, id: u32) -> AppResult<Genre> {
        self.storage
            .genre(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    #[tokio::test]
    async fn test_lookup() {
        let reference = ReferenceService::new(Arc::new(MemoryStorage::with_reference_data()));
        assert_eq!(reference.mpa_rating(5).await.unwrap().name, "NC-17");
        assert_eq!(reference.genre(1).await.unwrap().name, "Comedy");
        assert!(matches!(
            reference.mpa_rating(6).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(reference.genre(0).await, Err(AppError::NotFound(_))));
    }
}
