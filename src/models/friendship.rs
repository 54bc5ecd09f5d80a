use serde::{Deserialize, Serialize};

use super::UserId;

/// Confirmation state of a directed friendship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipState {
    /// One-directional request not yet reciprocated
    Pending,
    /// Both users have asked for the friendship
    Confirmed,
}

impl FriendshipState {
    /// Numeric code used by the legacy `friendship_type` column
    pub fn code(self) -> u8 {
        match self {
            FriendshipState::Pending => 1,
            FriendshipState::Confirmed => 2,
        }
    }
}

/// Directed friendship edge. `from` is the user who asked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipEdge {
    pub from: UserId,
    pub to: UserId,
    pub state: FriendshipState,
}

impl FriendshipEdge {
    pub fn pending(from: UserId, to: UserId) -> Self {
        Self {
            from,
            to,
            state: FriendshipState::Pending,
        }
    }

    pub fn confirmed(from: UserId, to: UserId) -> Self {
        Self {
            from,
            to,
            state: FriendshipState::Confirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == FriendshipState::Confirmed
    }

    /// The user on the other end of the edge, if `user` is one of its endpoints
    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        if self.from == user {
            Some(self.to)
        } else if self.to == user {
            Some(self.from)
        } else {
            None
        }
    }
}

/// A single edge mutation, committed together with its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    /// Insert the edge, replacing any edge on the same ordered pair
    Put(FriendshipEdge),
    /// Remove the edge on the ordered pair, if any
    Delete { from: UserId, to: UserId },
}
