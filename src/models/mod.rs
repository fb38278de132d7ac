//! Data models for ghibli-core.
//!
//! Entities normalized from the remote catalog, the filter vocabulary, the
//! read-only presentation projections built by use cases, and the reference
//! resolver for URL-shaped cross-entity identifiers.

mod film;
mod filter;
mod reference;
mod ui;

pub use film::{Film, Person, Specie};
pub use filter::{FAVORITE_FILTER, Filter, FilterKind};
pub use reference::{extract_reference_id, is_collection_reference};
pub use ui::{ErrorTag, FilmDetailUiModel, FilmUiModel, FilterUiModel};
