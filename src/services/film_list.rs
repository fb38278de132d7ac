//! Visible film list derivation.

use crate::models::{
    Film, FilmUiModel, Filter, FilterKind, extract_reference_id, is_collection_reference,
};
use crate::repository::GhibliRepository;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

/// Computes the film list under the selected filters.
///
/// Read failures of the filters, favorites and catalog degrade to empty inputs.
/// Films are kept if any selected filter allows them, marked with their favorite
/// state and sorted by release date string.
#[derive(Clone)]
pub struct GetFilmList {
    repository: Arc<GhibliRepository>,
}

impl GetFilmList {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Returns the visible films.
    ///
    /// # Errors
    ///
    /// An empty result fails with [`Error::FavoritesEmpty`] when the favorite
    /// filter is the only one selected, and with [`Error::ApiFailure`] otherwise.
    #[instrument(skip(self), fields(operation = "get_film_list"))]
    pub async fn execute(&self) -> Result<Vec<FilmUiModel>> {
        let selected_filters = or_empty(
            self.repository.get_selected_filters().await,
            "selected filters",
        );
        let favorite_films =
            or_empty(self.repository.get_favorite_films().await, "favorite films");
        let favorite_ids: HashSet<String> =
            favorite_films.iter().map(|film| film.id.clone()).collect();
        let films = or_empty(self.repository.get_films().await, "films");

        let visible: Vec<Film> = if selected_filters.is_empty() {
            films
        } else {
            let allowed = self.allowed_film_ids(&selected_filters, &favorite_ids).await;
            let candidates = if films.is_empty() { favorite_films } else { films };
            candidates
                .into_iter()
                .filter(|film| allowed.contains(&film.id))
                .collect()
        };

        let mut models: Vec<FilmUiModel> = visible
            .into_iter()
            .map(|film| FilmUiModel {
                is_favorite: favorite_ids.contains(&film.id),
                id: film.id,
                title: film.title,
                description: film.description,
                release_date: film.release_date,
            })
            .collect();
        models.sort_by(|a, b| a.release_date.cmp(&b.release_date));

        if models.is_empty() {
            return Err(empty_list_error(&selected_filters));
        }
        Ok(models)
    }

    /// Union of the film ids each selected filter allows.
    async fn allowed_film_ids(
        &self,
        filters: &[Filter],
        favorite_ids: &HashSet<String>,
    ) -> HashSet<String> {
        let mut allowed = HashSet::new();
        for filter in filters {
            match filter.kind {
                FilterKind::BySpecies => {
                    for reference in self.specie_film_references(&filter.id).await {
                        allowed.insert(extract_reference_id(&reference).to_string());
                    }
                },
                FilterKind::ByFavorite => allowed.extend(favorite_ids.iter().cloned()),
            }
        }
        allowed
    }

    async fn specie_film_references(&self, specie_id: &str) -> Vec<String> {
        let specie = match self.repository.get_specie(specie_id).await {
            Ok(specie) => specie,
            Err(e) => {
                tracing::warn!(specie_id, error = %e, "Ignoring filter for unavailable specie");
                return Vec::new();
            },
        };

        if is_collection_reference(&specie.film_references) {
            or_empty(self.repository.get_species().await, "species")
                .into_iter()
                .flat_map(|specie| specie.film_references)
                .collect()
        } else {
            specie.film_references
        }
    }
}

fn or_empty<T>(result: Result<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read {what}, using an empty list");
        Vec::new()
    })
}

fn empty_list_error(selected_filters: &[Filter]) -> Error {
    match selected_filters {
        [only] if only.kind == FilterKind::ByFavorite => Error::FavoritesEmpty,
        _ => Error::ApiFailure,
    }
}
