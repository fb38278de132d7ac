//! Film list filters.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a filter selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Keep films in which a given species appears.
    BySpecies,
    /// Keep favorited films only.
    ByFavorite,
}

impl FilterKind {
    /// Returns the tag persisted for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BySpecies => "species",
            Self::ByFavorite => "favorite",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "species" => Ok(Self::BySpecies),
            "favorite" => Ok(Self::ByFavorite),
            other => Err(Error::InvalidInput(format!("unknown filter kind: {other}"))),
        }
    }
}

/// A filter over the film list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    /// Filter identifier; the species id for [`FilterKind::BySpecies`].
    pub id: String,
    /// Display name.
    pub name: String,
    /// What the filter selects on.
    pub kind: FilterKind,
}

impl Filter {
    /// Creates a species filter.
    #[must_use]
    pub fn species(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: FilterKind::BySpecies,
        }
    }

    /// Returns the "show favorites only" sentinel filter.
    #[must_use]
    pub fn favorite() -> Self {
        Self {
            id: FAVORITE_FILTER.id.to_string(),
            name: FAVORITE_FILTER.name.to_string(),
            kind: FilterKind::ByFavorite,
        }
    }

    /// Returns `true` if this is the favorite sentinel filter.
    #[must_use]
    pub fn is_favorite_sentinel(&self) -> bool {
        self.kind == FilterKind::ByFavorite && self.id == FAVORITE_FILTER.id
    }
}

/// Well-known identity of the favorite sentinel filter.
pub struct FavoriteFilterIdentity {
    /// Fixed identifier.
    pub id: &'static str,
    /// Fixed display name.
    pub name: &'static str,
}

/// The favorite sentinel filter identity.
pub const FAVORITE_FILTER: FavoriteFilterIdentity = FavoriteFilterIdentity {
    id: "favorite_id",
    name: "Favorite",
};
