use serde::{Deserialize, Serialize};

/// MPA age rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpaRating {
    pub id: u32,
    pub name: String,
}

/// Film genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

impl MpaRating {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    /// Ratings loaded into a fresh catalog
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(1, "G"),
            Self::new(2, "PG"),
            Self::new(3, "PG-13"),
            Self::new(4, "R"),
            Self::new(5, "NC-17"),
        ]
    }
}

impl Genre {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    /// Genres loaded into a fresh catalog
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(1, "Comedy"),
            Self::new(2, "Drama"),
            Self::new(3, "Animation"),
            Self::new(4, "Thriller"),
            Self::new(5, "Documentary"),
            Self::new(6, "Action"),
        ]
    }
}
