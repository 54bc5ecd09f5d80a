use std::sync::Arc;

use chrono::Utc;

use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{User, UserId, UserPayload},
};

/// Registration and lookup of users
pub struct UserService {
    storage: Arc<dyn Storage>,
}

impl UserService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, payload: UserPayload) -> AppResult<User> {
        let draft = payload
            .into_draft(Utc::now().date_naive())
            .map_err(AppError::Validation)?;
        let user = self.storage.insert_user(draft).await?;
        tracing::info!(user_id = %user.id, login = %user.login, "User created");
        Ok(user)
    }

    pub async fn update(&self, payload: UserPayload) -> AppResult<User> {
        let id = payload
            .id
            .ok_or_else(|| AppError::Validation(vec!["id: must be present".to_string()]))?;
        let draft = payload
            .into_draft(Utc::now().date_naive())
            .map_err(AppError::Validation)?;

        let user = self
            .storage
            .update_user(id, draft)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))?;
        tracing::info!(user_id = %id, "User updated");
        Ok(user)
    }

    pub async fn get(&self, id: UserId) -> AppResult<User> {
        self.storage
            .user(id)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.storage.users().await?)
    }

    /// Loads the users behind `ids`, keeping the iteration order
    pub async fn resolve<I>(&self, ids: I) -> AppResult<Vec<User>>
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut users = Vec::new();
        for id in ids {
            users.push(self.get(id).await?);
        }
        Ok(users)
    }
}
