//! Presentation projections derived by use cases. Never persisted.

use super::{Filter, FilterKind};
use serde::Serialize;

/// Error classification rendered by list and detail screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorTag {
    /// The catalog could not be loaded.
    Api,
    /// Favorite data is missing or empty.
    Favorite,
}

/// One row of the film list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmUiModel {
    /// Film identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Release date string, also the sort key.
    pub release_date: String,
    /// Whether the film is currently a favorite.
    pub is_favorite: bool,
}

/// The film detail screen model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmDetailUiModel {
    /// Film identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Director name.
    pub director: String,
    /// Producer name.
    pub producer: String,
    /// Release date string.
    pub release_date: String,
    /// Running time in minutes.
    pub running_time: String,
    /// Rotten Tomatoes score.
    pub rt_score: String,
    /// Names of the people appearing in the film.
    pub people: Vec<String>,
    /// Whether the film is currently a favorite.
    pub is_favorite: bool,
}

/// One selectable entry of the filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterUiModel {
    /// Filter identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the filter is currently selected.
    pub is_selected: bool,
    /// What the filter selects on.
    pub kind: FilterKind,
}

impl FilterUiModel {
    /// The filter this row toggles.
    #[must_use]
    pub fn to_filter(&self) -> Filter {
        Filter {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}
