//! # Ghibli Core
//!
//! Data-synchronization core for a Studio Ghibli film catalog client.
//!
//! The crate reconciles three sources of truth behind one repository:
//!
//! - a remote, read-only catalog API (films, species, people)
//! - a process-lifetime in-memory response cache
//! - a durable local store for favorite films, favorite people and selected filters
//!
//! On top of the repository sit the use cases that derive presentation models
//! (filtered and sorted film lists, favorite-aware film details, filter lists)
//! and the framework-neutral presentation models that keep screen state in sync
//! with local-store changes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ghibli_core::config::GhibliConfig;
//! use ghibli_core::services::ServiceContainer;
//!
//! let container = ServiceContainer::from_config(&GhibliConfig::load_default())?;
//! let films = container.get_film_list().execute().await?;
//! for film in films {
//!     println!("{} ({})", film.title, film.release_date);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod api;
pub mod config;
pub mod models;
pub mod observability;
pub mod presentation;
pub mod repository;
pub mod services;
pub mod storage;

pub use api::{HttpRemoteClient, RemoteClient, StubRemoteClient};
pub use config::GhibliConfig;
pub use models::{
    ErrorTag, FAVORITE_FILTER, Film, FilmDetailUiModel, FilmUiModel, Filter, FilterKind,
    FilterUiModel, Person, Specie, extract_reference_id, is_collection_reference,
};
pub use repository::GhibliRepository;
pub use services::ServiceContainer;
pub use storage::{InMemoryCache, LocalStore, ResponseCache, SqliteLocalStore};

/// Error type for ghibli-core operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `ApiFailure` | A use case exhausted the cache/remote path and has nothing to show |
/// | `FavoritesEmpty` | The favorites-only view is empty, or a favorite person is missing |
/// | `Remote` | HTTP transport fails, non-2xx status, or the body cannot be decoded |
/// | `NotFound` | A local-store point read or delete targets an absent record |
/// | `OperationFailed` | `SQLite`, lock, filesystem or runtime failures |
/// | `InvalidInput` | Persisted values or configuration cannot be interpreted |
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// The catalog could not be loaded from the cache or the remote API.
    #[error("failed to load data from the film catalog")]
    ApiFailure,

    /// The favorites view has nothing to show.
    #[error("no favorite films available")]
    FavoritesEmpty,

    /// A remote request failed.
    ///
    /// Raised when:
    /// - The HTTP request cannot be sent or times out
    /// - The API answers with a non-success status
    /// - The response body is not valid JSON for the expected record
    #[error("remote request '{operation}' failed: {cause}")]
    Remote {
        /// The remote operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A record was not found in the local store.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - Filesystem I/O errors occur
    /// - A background task panics or is cancelled
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Returns the presentation classification of this error, if it has one.
    ///
    /// Only the two use-case classifications carry a tag; passthrough failures
    /// return `None`.
    #[must_use]
    pub const fn tag(&self) -> Option<ErrorTag> {
        match self {
            Self::ApiFailure => Some(ErrorTag::Api),
            Self::FavoritesEmpty => Some(ErrorTag::Favorite),
            _ => None,
        }
    }
}

/// Result type alias for ghibli-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("bad kind".to_string());
        assert_eq!(err.to_string(), "invalid input: bad kind");

        let err = Error::Remote {
            operation: "get_films".to_string(),
            cause: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "remote request 'get_films' failed: timeout");

        let err = Error::NotFound("favorite film id1".to_string());
        assert_eq!(err.to_string(), "not found: favorite film id1");
    }

    #[test]
    fn test_error_tag() {
        assert_eq!(Error::ApiFailure.tag(), Some(ErrorTag::Api));
        assert_eq!(Error::FavoritesEmpty.tag(), Some(ErrorTag::Favorite));
        assert_eq!(Error::NotFound("x".to_string()).tag(), None);
    }
}
