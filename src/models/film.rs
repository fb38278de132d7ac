//! Catalog entities.

use serde::{Deserialize, Serialize};

/// A film from the catalog.
///
/// Produced either by normalizing a remote film record (absent text fields become
/// the `"-"` placeholder) or by reading a favorited film back from the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    /// Catalog identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Director name.
    pub director: String,
    /// Producer name.
    pub producer: String,
    /// Release date as published by the API (usually a year).
    pub release_date: String,
    /// Running time in minutes, as published.
    pub running_time: String,
    /// Rotten Tomatoes score, as published.
    pub rt_score: String,
    /// People references, in API order.
    pub people_references: Vec<String>,
}

/// A species from the catalog, used as a film filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specie {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// References to the films this species appears in.
    pub film_references: Vec<String>,
}

/// A person (character) from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Person {
    /// Creates a person.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
