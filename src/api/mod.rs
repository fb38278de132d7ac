//! Remote catalog client.
//!
//! A pure network boundary: six fetch operations that return raw API-shaped
//! records or fail. No retry, no caching, no local fallback; failure causes
//! propagate unchanged to the caller.

mod http;
mod stub;

pub use http::HttpRemoteClient;
pub use stub::StubRemoteClient;

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// A film as returned by the API. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilmRecord {
    /// Catalog identifier.
    pub id: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Synopsis.
    pub description: Option<String>,
    /// Director name.
    pub director: Option<String>,
    /// Producer name.
    pub producer: Option<String>,
    /// Release date.
    pub release_date: Option<String>,
    /// Running time in minutes.
    pub running_time: Option<String>,
    /// Rotten Tomatoes score.
    pub rt_score: Option<String>,
    /// People references.
    #[serde(rename = "people")]
    pub people_references: Option<Vec<String>>,
}

/// A species as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SpecieRecord {
    /// Catalog identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Film references.
    #[serde(rename = "films")]
    pub film_references: Option<Vec<String>>,
}

/// A person as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonRecord {
    /// Catalog identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// Trait for remote catalog backends.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetches the film collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_films(&self) -> Result<Vec<FilmRecord>>;

    /// Fetches one film by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_film(&self, id: &str) -> Result<FilmRecord>;

    /// Fetches the species collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_species(&self) -> Result<Vec<SpecieRecord>>;

    /// Fetches one species by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_specie(&self, id: &str) -> Result<SpecieRecord>;

    /// Fetches the people collection.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_people(&self) -> Result<Vec<PersonRecord>>;

    /// Fetches one person by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Remote`] if the request or decoding fails.
    async fn get_person(&self, id: &str) -> Result<PersonRecord>;
}
