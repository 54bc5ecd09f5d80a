use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;

use super::{ensure_user, locks::KeyedLocks};
use crate::{
    db::Storage,
    error::{AppError, AppResult},
    models::{EdgeChange, FriendshipEdge, FriendshipState, UserId},
};

/// Friendship request/confirm protocol over directed edges.
///
/// A request creates `Pending(from -> to)`. A request in the opposite
/// direction promotes that edge to `Confirmed` in place. Removing a confirmed
/// friendship leaves the other user's request standing as
/// `Pending(to -> from)`.
pub struct FriendshipGraph {
    storage: Arc<dyn Storage>,
    pair_locks: KeyedLocks<(UserId, UserId)>,
}

/// Lock key shared by both orderings of a pair
fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FriendshipGraph {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            pair_locks: KeyedLocks::new(),
        }
    }

    /// Records that `from` wants to be friends with `to`
    #[instrument(skip(self))]
    pub async fn request_friend(&self, from: UserId, to: UserId) -> AppResult<()> {
        ensure_user(self.storage.as_ref(), from).await?;
        ensure_user(self.storage.as_ref(), to).await?;
        if from == to {
            return Err(AppError::InvalidInput(
                "A user cannot send a friend request to themselves".to_string(),
            ));
        }

        let _guard = self.pair_locks.lock(pair_key(from, to)).await;

        let outgoing = self.storage.friendship(from, to).await?;
        let incoming = self.storage.friendship(to, from).await?;

        let changes = match (outgoing, incoming) {
            (outgoing, Some(edge)) if edge.state == FriendshipState::Pending => {
                tracing::info!("Counterpart already asked, confirming friendship");
                let mut changes = vec![EdgeChange::Put(FriendshipEdge::confirmed(to, from))];
                if outgoing.is_some() {
                    changes.push(EdgeChange::Delete { from, to });
                }
                changes
            }
            (Some(edge), _) => {
                tracing::debug!(
                    friendship_type = edge.state.code(),
                    "Friend request already recorded"
                );
                return Ok(());
            }
            (None, Some(_)) => {
                tracing::debug!("Users are already friends");
                return Ok(());
            }
            (None, None) => vec![EdgeChange::Put(FriendshipEdge::pending(from, to))],
        };

        self.storage.apply_friendship(changes).await?;
        tracing::info!("Friend request recorded");
        Ok(())
    }

    /// Withdraws `from`'s side of the relationship with `to`
    #[instrument(skip(self))]
    pub async fn remove_friend(&self, from: UserId, to: UserId) -> AppResult<()> {
        ensure_user(self.storage.as_ref(), from).await?;
        ensure_user(self.storage.as_ref(), to).await?;

        let _guard = self.pair_locks.lock(pair_key(from, to)).await;

        let outgoing = self.storage.friendship(from, to).await?;
        let incoming = self.storage.friendship(to, from).await?;

        let changes = match (outgoing, incoming) {
            (Some(edge), _) if edge.state == FriendshipState::Pending => {
                tracing::info!("Cancelling outgoing friend request");
                vec![EdgeChange::Delete { from, to }]
            }
            (Some(_), _) => {
                tracing::info!("Downgrading confirmed friendship to the counterpart's request");
                vec![
                    EdgeChange::Delete { from, to },
                    EdgeChange::Put(FriendshipEdge::pending(to, from)),
                ]
            }
            (None, Some(edge)) if edge.is_confirmed() => {
                tracing::info!("Downgrading confirmed friendship to the counterpart's request");
                vec![EdgeChange::Put(FriendshipEdge::pending(to, from))]
            }
            _ => {
                tracing::warn!("Users are not friends");
                return Err(AppError::NotFound(format!(
                    "Users {} and {} are not friends",
                    from, to
                )));
            }
        };

        self.storage.apply_friendship(changes).await?;
        Ok(())
    }

    /// Confirmed friends of `id` plus everyone `id` has an open request to
    #[instrument(skip(self))]
    pub async fn friends(&self, id: UserId) -> AppResult<BTreeSet<UserId>> {
        ensure_user(self.storage.as_ref(), id).await?;
        self.friend_set(id).await
    }

    /// Users present in the friend sets of both `a` and `b`
    #[instrument(skip(self))]
    pub async fn mutual_friends(&self, a: UserId, b: UserId) -> AppResult<BTreeSet<UserId>> {
        ensure_user(self.storage.as_ref(), a).await?;
        ensure_user(self.storage.as_ref(), b).await?;

        let first = self.friend_set(a).await?;
        let second = self.friend_set(b).await?;
        Ok(first.intersection(&second).copied().collect())
    }

    async fn friend_set(&self, id: UserId) -> AppResult<BTreeSet<UserId>> {
        let edges = self.storage.friendships_of(id).await?;
        Ok(edges
            .iter()
            .filter(|edge| edge.from == id || edge.is_confirmed())
            .filter_map(|edge| edge.counterpart(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStorage, MockStorage, StorageError};
    use crate::services::test_support::add_user;
    use tokio_test::{assert_err, assert_ok};

    async fn graph_with_users(count: usize) -> (FriendshipGraph, Arc<MemoryStorage>, Vec<UserId>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut ids = Vec::new();
        for i in 0..count {
            ids.push(add_user(storage.as_ref(), &format!("user{}", i)).await);
        }
        (FriendshipGraph::new(storage.clone()), storage, ids)
    }

    fn ids(raw: &[UserId]) -> BTreeSet<UserId> {
        raw.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_request_creates_pending_edge() {
        let (graph, storage, u) = graph_with_users(2).await;

        assert_ok!(graph.request_friend(u[0], u[1]).await);

        assert_eq!(
            storage.friendship(u[0], u[1]).await.unwrap(),
            Some(FriendshipEdge::pending(u[0], u[1]))
        );
        assert_eq!(graph.friends(u[0]).await.unwrap(), ids(&[u[1]]));
        assert!(graph.friends(u[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reciprocal_request_confirms_in_place() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        graph.request_friend(u[1], u[0]).await.unwrap();

        assert_eq!(
            storage.friendship(u[0], u[1]).await.unwrap(),
            Some(FriendshipEdge::confirmed(u[0], u[1]))
        );
        assert_eq!(storage.friendship(u[1], u[0]).await.unwrap(), None);
        assert_eq!(graph.friends(u[0]).await.unwrap(), ids(&[u[1]]));
        assert_eq!(graph.friends(u[1]).await.unwrap(), ids(&[u[0]]));
    }

    #[tokio::test]
    async fn test_repeated_request_is_a_no_op() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        assert_ok!(graph.request_friend(u[0], u[1]).await);

        assert_eq!(
            storage.friendships_of(u[0]).await.unwrap(),
            vec![FriendshipEdge::pending(u[0], u[1])]
        );
    }

    #[tokio::test]
    async fn test_request_between_confirmed_friends_changes_nothing() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        graph.request_friend(u[1], u[0]).await.unwrap();
        graph.request_friend(u[1], u[0]).await.unwrap();
        graph.request_friend(u[0], u[1]).await.unwrap();

        assert_eq!(
            storage.friendships_of(u[0]).await.unwrap(),
            vec![FriendshipEdge::confirmed(u[0], u[1])]
        );
    }

    #[tokio::test]
    async fn test_request_with_unknown_user_fails_before_mutation() {
        let (graph, storage, u) = graph_with_users(1).await;

        let err = graph.request_friend(u[0], UserId(42)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg.contains("42")));

        let err = graph.request_friend(UserId(41), u[0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg.contains("41")));

        assert!(storage.friendships_of(u[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_request_is_rejected() {
        let (graph, _, u) = graph_with_users(1).await;
        let err = graph.request_friend(u[0], u[0]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_remove_pending_cancels_request() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        assert_ok!(graph.remove_friend(u[0], u[1]).await);

        assert!(storage.friendships_of(u[0]).await.unwrap().is_empty());
        assert!(graph.friends(u[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_confirmed_leaves_counterpart_request() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        graph.request_friend(u[1], u[0]).await.unwrap();
        graph.remove_friend(u[0], u[1]).await.unwrap();

        assert_eq!(
            storage.friendships_of(u[0]).await.unwrap(),
            vec![FriendshipEdge::pending(u[1], u[0])]
        );
        assert!(graph.friends(u[0]).await.unwrap().is_empty());
        assert_eq!(graph.friends(u[1]).await.unwrap(), ids(&[u[0]]));
    }

    #[tokio::test]
    async fn test_remove_confirmed_from_the_confirming_side() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        graph.request_friend(u[1], u[0]).await.unwrap();
        graph.remove_friend(u[1], u[0]).await.unwrap();

        assert_eq!(
            storage.friendships_of(u[0]).await.unwrap(),
            vec![FriendshipEdge::pending(u[0], u[1])]
        );
        assert_eq!(graph.friends(u[0]).await.unwrap(), ids(&[u[1]]));
        assert!(graph.friends(u[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_without_edge_is_not_found() {
        let (graph, _, u) = graph_with_users(2).await;

        let err = graph.remove_friend(u[0], u[1]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg.contains("not friends")));
    }

    #[tokio::test]
    async fn test_incoming_request_cannot_be_removed_by_recipient() {
        let (graph, storage, u) = graph_with_users(2).await;

        graph.request_friend(u[0], u[1]).await.unwrap();
        assert_err!(graph.remove_friend(u[1], u[0]).await);

        assert_eq!(
            storage.friendship(u[0], u[1]).await.unwrap(),
            Some(FriendshipEdge::pending(u[0], u[1]))
        );
    }

    #[tokio::test]
    async fn test_mutual_friends() {
        let (graph, _, u) = graph_with_users(4).await;

        // u0 and u1 both reach u2; only u0 reaches u3
        graph.request_friend(u[0], u[2]).await.unwrap();
        graph.request_friend(u[1], u[2]).await.unwrap();
        graph.request_friend(u[2], u[1]).await.unwrap();
        graph.request_friend(u[0], u[3]).await.unwrap();

        assert_eq!(graph.mutual_friends(u[0], u[1]).await.unwrap(), ids(&[u[2]]));
        assert!(graph.mutual_friends(u[2], u[3]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutual_friends_requires_both_users() {
        let (graph, _, u) = graph_with_users(1).await;
        let err = graph.mutual_friends(u[0], UserId(7)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_friends_of_unknown_user_is_not_found() {
        let (graph, _, _) = graph_with_users(0).await;
        assert!(matches!(
            graph.friends(UserId(1)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_cross_requests_end_confirmed() {
        let (graph, storage, u) = graph_with_users(2).await;
        let graph = Arc::new(graph);

        let (a, b) = (u[0], u[1]);
        let first = tokio::spawn({
            let graph = graph.clone();
            async move { graph.request_friend(a, b).await }
        });
        let second = tokio::spawn({
            let graph = graph.clone();
            async move { graph.request_friend(b, a).await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let edges = storage.friendships_of(a).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert!(edges[0].is_confirmed());
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced() {
        let mut storage = MockStorage::new();
        storage.expect_user_exists().returning(|_| Ok(true));
        storage.expect_friendship().returning(|_, _| Ok(None));
        storage
            .expect_apply_friendship()
            .times(1)
            .returning(|_| Err(StorageError::Unavailable("connection reset".to_string())));

        let graph = FriendshipGraph::new(Arc::new(storage));
        let err = graph.request_friend(UserId(1), UserId(2)).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_user_stops_before_edge_lookup() {
        let mut storage = MockStorage::new();
        storage
            .expect_user_exists()
            .returning(|id| Ok(id == UserId(1)));
        storage.expect_friendship().never();
        storage.expect_apply_friendship().never();

        let graph = FriendshipGraph::new(Arc::new(storage));
        let err = graph.remove_friend(UserId(1), UserId(2)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
