use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod film;
pub mod friendship;
pub mod reference;
pub mod user;

pub use film::{Film, FilmDraft, FilmPayload, ReferenceId};
pub use friendship::{EdgeChange, FriendshipEdge, FriendshipState};
pub use reference::{Genre, MpaRating};
pub use user::{User, UserDraft, UserPayload};

/// Identifier of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Identifier of a catalogued film
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(pub u64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for FilmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&UserId(12)).unwrap(), "12");
        assert_eq!(serde_json::to_string(&FilmId(3)).unwrap(), "3");

        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id, UserId(7));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", UserId(5)), "5");
        assert_eq!(format!("{}", FilmId(9)), "9");
    }
}
