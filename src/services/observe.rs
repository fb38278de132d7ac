//! Live views over the local store.

use crate::repository::GhibliRepository;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Streams the ids of the favorite films.
#[derive(Clone)]
pub struct ObserveFavoriteFilms {
    repository: Arc<GhibliRepository>,
}

impl ObserveFavoriteFilms {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Current favorite ids first, then one set per change.
    #[must_use]
    pub fn execute(&self) -> BoxStream<'static, BTreeSet<String>> {
        self.repository
            .observe_favorite_films()
            .map(|films| films.into_iter().map(|film| film.id).collect())
            .boxed()
    }
}

/// Streams the ids of the selected filters.
#[derive(Clone)]
pub struct ObserveFilters {
    repository: Arc<GhibliRepository>,
}

impl ObserveFilters {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Current selected filter ids first, then one list per change.
    #[must_use]
    pub fn execute(&self) -> BoxStream<'static, Vec<String>> {
        self.repository
            .observe_selected_filters()
            .map(|filters| filters.into_iter().map(|filter| filter.id).collect())
            .boxed()
    }
}
