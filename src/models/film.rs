use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{FilmId, Genre, MpaRating, UserId};

/// Longest accepted film description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Release dates before the first public film screening are rejected
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

/// A catalogued film together with its like set.
///
/// `rate` is a cached `likes.len()`; both are only changed together by the
/// storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: u32,
    pub mpa: Option<MpaRating>,
    pub genres: Vec<Genre>,
    pub likes: BTreeSet<UserId>,
    pub rate: u64,
}

/// Reference to a catalog entry by id, as in `{"id": 3}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceId {
    pub id: u32,
}

/// Incoming film body for create and update requests
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmPayload {
    /// Required on update, ignored on create
    #[serde(default)]
    pub id: Option<FilmId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub mpa: Option<ReferenceId>,
    #[serde(default)]
    pub genres: Vec<ReferenceId>,
}

/// Validated descriptive film fields with resolved references
#[derive(Debug, Clone, PartialEq)]
pub struct FilmDraft {
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: u32,
    pub mpa: Option<MpaRating>,
    pub genres: Vec<Genre>,
}

impl Film {
    /// Builds a film with an empty like set
    pub fn from_draft(id: FilmId, draft: FilmDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            release_date: draft.release_date,
            duration: draft.duration,
            mpa: draft.mpa,
            genres: draft.genres,
            likes: BTreeSet::new(),
            rate: 0,
        }
    }

    /// Replaces descriptive fields, leaving likes and rate untouched
    pub fn apply_draft(&mut self, draft: FilmDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.release_date = draft.release_date;
        self.duration = draft.duration;
        self.mpa = draft.mpa;
        self.genres = draft.genres;
    }
}

impl FilmPayload {
    /// Checks field constraints, reporting every violation as `field: message`.
    ///
    /// On success returns the release date and duration in their stored form.
    pub fn validate(&self) -> Result<(NaiveDate, u32), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("name: must not be blank".to_string());
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "description: must be at most {} characters",
                MAX_DESCRIPTION_LEN
            ));
        }
        let release_date = match self.release_date {
            None => {
                errors.push("releaseDate: must be present".to_string());
                None
            }
            Some(date) if date < earliest_release_date() => {
                errors.push("releaseDate: must not be before 1895-12-28".to_string());
                None
            }
            Some(date) => Some(date),
        };
        let duration = match self.duration.map(u32::try_from) {
            None => {
                errors.push("duration: must be present".to_string());
                None
            }
            Some(Ok(minutes)) if minutes > 0 => Some(minutes),
            Some(_) => {
                errors.push("duration: must be a positive number".to_string());
                None
            }
        };

        match (release_date, duration) {
            (Some(release_date), Some(duration)) if errors.is_empty() => {
                Ok((release_date, duration))
            }
            _ => Err(errors),
        }
    }

    /// Genre ids without duplicates, in ascending order
    pub fn genre_ids(&self) -> BTreeSet<u32> {
        self.genres.iter().map(|g| g.id).collect()
    }
}
