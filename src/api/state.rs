use std::sync::Arc;

use crate::config::Config;
use crate::db::{MemoryStorage, Storage};
use crate::services::{
    FilmService, FriendshipGraph, PopularityAggregate, ReferenceService, UserService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<UserService>,
    pub films: Arc<FilmService>,
    pub reference: Arc<ReferenceService>,
    pub friendships: Arc<FriendshipGraph>,
    pub popularity: Arc<PopularityAggregate>,
}

impl AppState {
    /// Wires every service on top of one storage backend
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let reference = Arc::new(ReferenceService::new(storage.clone()));
        Self {
            config: Arc::new(config),
            users: Arc::new(UserService::new(storage.clone())),
            films: Arc::new(FilmService::new(storage.clone(), reference.clone())),
            reference,
            friendships: Arc::new(FriendshipGraph::new(storage.clone())),
            popularity: Arc::new(PopularityAggregate::new(storage)),
        }
    }

    /// State backed by a fresh in-memory storage
    pub fn in_memory(config: Config) -> Self {
        let storage: Arc<dyn Storage> = if config.seed_reference_data {
            Arc::new(MemoryStorage::with_reference_data())
        } else {
            Arc::new(MemoryStorage::new())
        };
        Self::new(config, storage)
    }
}
