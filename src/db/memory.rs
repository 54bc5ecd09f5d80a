use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use super::{LikeCommit, Storage, StorageError, StorageResult};
use crate::models::{
    EdgeChange, Film, FilmDraft, FilmId, FriendshipEdge, FriendshipState, Genre, MpaRating, User,
    UserDraft, UserId,
};

/// In-process storage backend.
///
/// Every write takes the single write lock, which makes each trait method one
/// atomic unit of work. Ids are assigned sequentially from 1.
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    films: BTreeMap<FilmId, Film>,
    edges: HashMap<(UserId, UserId), FriendshipState>,
    mpa: BTreeMap<u32, MpaRating>,
    genres: BTreeMap<u32, Genre>,
    last_user_id: u64,
    last_film_id: u64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates an empty storage without reference data
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Creates a storage preloaded with the default MPA ratings and genres
    pub fn with_reference_data() -> Self {
        let mut inner = Inner::default();
        inner.mpa = MpaRating::defaults().into_iter().map(|m| (m.id, m)).collect();
        inner.genres = Genre::defaults().into_iter().map(|g| (g.id, g)).collect();
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn user_exists(&self, id: UserId) -> StorageResult<bool> {
        Ok(self.inner.read().await.users.contains_key(&id))
    }

    async fn insert_user(&self, draft: UserDraft) -> StorageResult<User> {
        let mut inner = self.inner.write().await;
        inner.last_user_id += 1;
        let user = User::from_draft(UserId(inner.last_user_id), draft);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> StorageResult<Option<User>> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(existing) => {
                *existing = User::from_draft(id, draft);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn user(&self, id: UserId) -> StorageResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn users(&self) -> StorageResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn film_exists(&self, id: FilmId) -> StorageResult<bool> {
        Ok(self.inner.read().await.films.contains_key(&id))
    }

    async fn insert_film(&self, draft: FilmDraft) -> StorageResult<Film> {
        let mut inner = self.inner.write().await;
        inner.last_film_id += 1;
        let film = Film::from_draft(FilmId(inner.last_film_id), draft);
        inner.films.insert(film.id, film.clone());
        Ok(film)
    }

    async fn update_film(&self, id: FilmId, draft: FilmDraft) -> StorageResult<Option<Film>> {
        let mut inner = self.inner.write().await;
        match inner.films.get_mut(&id) {
            Some(existing) => {
                existing.apply_draft(draft);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn film(&self, id: FilmId) -> StorageResult<Option<Film>> {
        Ok(self.inner.read().await.films.get(&id).cloned())
    }

    async fn films(&self) -> StorageResult<Vec<Film>> {
        Ok(self.inner.read().await.films.values().cloned().collect())
    }

    async fn insert_like(&self, film_id: FilmId, user: UserId) -> StorageResult<LikeCommit> {
        let mut inner = self.inner.write().await;
        let film = inner.films.get_mut(&film_id).ok_or_else(|| {
            StorageError::WriteRejected(format!("film {} does not exist", film_id))
        })?;

        let applied = film.likes.insert(user);
        if applied {
            film.rate += 1;
        }
        Ok(LikeCommit {
            applied,
            rate: film.rate,
        })
    }

    async fn delete_like(&self, film_id: FilmId, user: UserId) -> StorageResult<LikeCommit> {
        let mut inner = self.inner.write().await;
        let film = inner.films.get_mut(&film_id).ok_or_else(|| {
            StorageError::WriteRejected(format!("film {} does not exist", film_id))
        })?;

        let applied = film.likes.remove(&user);
        if applied {
            film.rate = film.rate.saturating_sub(1);
        }
        Ok(LikeCommit {
            applied,
            rate: film.rate,
        })
    }

    async fn friendship(
        &self,
        from: UserId,
        to: UserId,
    ) -> StorageResult<Option<FriendshipEdge>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edges
            .get(&(from, to))
            .map(|&state| FriendshipEdge { from, to, state }))
    }

    async fn friendships_of(&self, user: UserId) -> StorageResult<Vec<FriendshipEdge>> {
        let inner = self.inner.read().await;
        let mut edges: Vec<FriendshipEdge> = inner
            .edges
            .iter()
            .filter(|((from, to), _)| *from == user || *to == user)
            .map(|(&(from, to), &state)| FriendshipEdge { from, to, state })
            .collect();
        edges.sort_by_key(|edge| (edge.from, edge.to));
        Ok(edges)
    }

    async fn apply_friendship(&self, changes: Vec<EdgeChange>) -> StorageResult<()> {
        let mut inner = self.inner.write().await;

        // Reject the whole batch before touching anything
        for change in &changes {
            if let EdgeChange::Put(edge) = change {
                for id in [edge.from, edge.to] {
                    if !inner.users.contains_key(&id) {
                        return Err(StorageError::WriteRejected(format!(
                            "user {} does not exist",
                            id
                        )));
                    }
                }
            }
        }

        for change in changes {
            match change {
                EdgeChange::Put(edge) => {
                    inner.edges.insert((edge.from, edge.to), edge.state);
                }
                EdgeChange::Delete { from, to } => {
                    inner.edges.remove(&(from, to));
                }
            }
        }
        Ok(())
    }

    async fn mpa_ratings(&self) -> StorageResult<Vec<MpaRating>> {
        Ok(self.inner.read().await.mpa.values().cloned().collect())
    }

    async fn mpa_rating(&self, id: u32) -> StorageResult<Option<MpaRating>> {
        Ok(self.inner.read().await.mpa.get(&id).cloned())
    }

    async fn genres(&self) -> StorageResult<Vec<Genre>> {
        Ok(self.inner.read().await.genres.values().cloned().collect())
    }

    async fn genre(&self, id: u32) -> StorageResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }
}
