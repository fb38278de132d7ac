//! Filter list.

use crate::models::{FAVORITE_FILTER, FilterKind, FilterUiModel};
use crate::repository::GhibliRepository;
use crate::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Lists one filter per specie, sorted by name, followed by the favorite filter.
#[derive(Clone)]
pub struct GetFilters {
    repository: Arc<GhibliRepository>,
}

impl GetFilters {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Returns the filters with their selection state.
    ///
    /// Unavailable species leave only the favorite filter.
    ///
    /// # Errors
    ///
    /// Never fails today; read failures degrade to empty inputs.
    #[instrument(skip(self), fields(operation = "get_filters"))]
    pub async fn execute(&self) -> Result<Vec<FilterUiModel>> {
        let species = self.repository.get_species().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Species unavailable, listing the favorite filter only");
            Vec::new()
        });
        let selected: HashSet<String> = self
            .repository
            .get_selected_filters()
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Selected filters unavailable");
                Vec::new()
            })
            .into_iter()
            .map(|filter| filter.id)
            .collect();

        let mut filters: Vec<FilterUiModel> = species
            .into_iter()
            .map(|specie| FilterUiModel {
                is_selected: selected.contains(&specie.id),
                id: specie.id,
                name: specie.name,
                kind: FilterKind::BySpecies,
            })
            .collect();
        filters.sort_by(|a, b| a.name.cmp(&b.name));

        filters.push(FilterUiModel {
            id: FAVORITE_FILTER.id.to_string(),
            name: FAVORITE_FILTER.name.to_string(),
            is_selected: selected.contains(FAVORITE_FILTER.id),
            kind: FilterKind::ByFavorite,
        });
        Ok(filters)
    }
}
