//! Favorite and filter toggles, and view switching.

use super::people::GetPeople;
use crate::models::Filter;
use crate::repository::GhibliRepository;
use crate::Result;
use std::sync::Arc;
use tracing::instrument;

/// Marks or unmarks a film as favorite.
#[derive(Clone)]
pub struct ToggleFavorite {
    repository: Arc<GhibliRepository>,
    get_people: GetPeople,
}

impl ToggleFavorite {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>, get_people: GetPeople) -> Self {
        Self {
            repository,
            get_people,
        }
    }

    /// Favorites film `film_id` with its people, or removes it.
    ///
    /// # Errors
    ///
    /// When favoriting, fails if the film or any of its people cannot be
    /// loaded; nothing is stored then. When removing, fails with
    /// [`crate::Error::NotFound`] if the film was not a favorite.
    #[instrument(skip(self), fields(operation = "toggle_favorite"))]
    pub async fn execute(&self, film_id: &str, make_favorite: bool) -> Result<()> {
        if !make_favorite {
            return self.repository.remove_favorite_film(film_id).await;
        }

        let film = self.repository.get_film(film_id).await?;
        let people = self.get_people.execute(&film.people_references, false).await?;
        self.repository.add_favorite_film(&film, &people).await
    }
}

/// Selects or deselects a filter.
#[derive(Clone)]
pub struct ToggleFilter {
    repository: Arc<GhibliRepository>,
}

impl ToggleFilter {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Selects `filter` if `select`, otherwise deselects it.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    #[instrument(skip(self, filter), fields(operation = "toggle_filter", filter_id = %filter.id))]
    pub async fn execute(&self, filter: &Filter, select: bool) -> Result<()> {
        if select {
            self.repository.add_selected_filter(filter).await
        } else {
            self.repository.remove_selected_filter(&filter.id).await
        }
    }
}

/// Switches between the full catalog and the favorites-only view.
#[derive(Clone)]
pub struct ViewFilms {
    repository: Arc<GhibliRepository>,
}

impl ViewFilms {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Clears the filters, then selects the favorite filter if `by_favorite`.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    #[instrument(skip(self), fields(operation = "view_films"))]
    pub async fn execute(&self, by_favorite: bool) -> Result<()> {
        self.repository.remove_selected_filters().await?;
        if by_favorite {
            self.repository.add_selected_filter(&Filter::favorite()).await?;
        }
        Ok(())
    }
}
