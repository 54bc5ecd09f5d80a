use crate::models::{
    EdgeChange, Film, FilmDraft, FilmId, FriendshipEdge, Genre, MpaRating, User, UserDraft,
    UserId,
};

pub mod memory;

pub use memory::MemoryStorage;

/// Failures reported by a storage backend
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    WriteRejected(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a like-set mutation, committed together with the rate change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeCommit {
    /// Whether the like set actually changed
    pub applied: bool,
    /// Film rate after the commit
    pub rate: u64,
}

/// Persistence boundary consumed by the services.
///
/// Each method is one unit of work: implementations must make `insert_like`,
/// `delete_like` and `apply_friendship` atomic, so that no reader observes a
/// like without its rate change or half of an edge replacement.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn user_exists(&self, id: UserId) -> StorageResult<bool>;

    async fn insert_user(&self, draft: UserDraft) -> StorageResult<User>;

    /// Returns `None` when no user has the id
    async fn update_user(&self, id: UserId, draft: UserDraft) -> StorageResult<Option<User>>;

    async fn user(&self, id: UserId) -> StorageResult<Option<User>>;

    /// All users in id order
    async fn users(&self) -> StorageResult<Vec<User>>;

    async fn film_exists(&self, id: FilmId) -> StorageResult<bool>;

    async fn insert_film(&self, draft: FilmDraft) -> StorageResult<Film>;

    /// Returns `None` when no film has the id. Likes and rate are preserved.
    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> StorageResult<Option<Film>>;

    async fn film(&self, id: FilmId) -> StorageResult<Option<Film>>;

    /// All films in id order
    async fn films(&self) -> StorageResult<Vec<Film>>;

    /// Adds `user` to the film's like set and increments the rate if absent
    async fn insert_like(&self, film: FilmId, user: UserId) -> StorageResult<LikeCommit>;

    /// Removes `user` from the film's like set and decrements the rate,
    /// never below zero, if present
    async fn delete_like(&self, film: FilmId, user: UserId) -> StorageResult<LikeCommit>;

    /// The edge stored on the ordered pair `(from, to)`
    async fn friendship(&self, from: UserId, to: UserId)
        -> StorageResult<Option<FriendshipEdge>>;

    /// Every edge with `user` at either end
    async fn friendships_of(&self, user: UserId) -> StorageResult<Vec<FriendshipEdge>>;

    /// Applies all changes in order as a single unit of work
    async fn apply_friendship(&self, changes: Vec<EdgeChange>) -> StorageResult<()>;

    async fn mpa_ratings(&self) -> StorageResult<Vec<MpaRating>>;

    async fn mpa_rating(&self, id: u32) -> StorageResult<Option<MpaRating>>;

    async fn genres(&self) -> StorageResult<Vec<Genre>>;

    async fn genre(&self, id: u32) -> StorageResult<Option<Genre>>;
}
