//! Composition root.

use super::{
    GetFilmDetail, GetFilmList, GetFilters, GetPeople, ObserveFavoriteFilms, ObserveFilters,
    ToggleFavorite, ToggleFilter, ViewFilms,
};
use crate::api::{HttpRemoteClient, RemoteClient};
use crate::config::GhibliConfig;
use crate::repository::GhibliRepository;
use crate::storage::{InMemoryCache, LocalStore, ResponseCache, SqliteLocalStore};
use crate::Result;
use std::sync::Arc;

/// Owns the shared repository and hands out use cases bound to it.
///
/// Use cases are cheap handles; create them on demand.
#[derive(Clone)]
pub struct ServiceContainer {
    repository: Arc<GhibliRepository>,
}

impl ServiceContainer {
    /// Builds the HTTP client, an empty cache and the `SQLite` store from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the local store
    /// cannot be opened.
    pub fn from_config(config: &GhibliConfig) -> Result<Self> {
        let store = Arc::new(SqliteLocalStore::open(config.database_path())?);
        Self::from_config_with_store(config, store)
    }

    /// Like [`Self::from_config`], over an already opened store.
    ///
    /// Lets the caller keep the concrete store, e.g. to poll it for commits
    /// made by other processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config_with_store(
        config: &GhibliConfig,
        store: Arc<SqliteLocalStore>,
    ) -> Result<Self> {
        let remote = HttpRemoteClient::new(&config.api)?;
        let database = store
            .db_path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        tracing::debug!(
            base_url = remote.base_url(),
            database = %database,
            "Built service container"
        );
        Ok(Self::with_components(
            Arc::new(remote),
            Arc::new(InMemoryCache::new()),
            store,
        ))
    }

    /// Wires caller-supplied components.
    #[must_use]
    pub fn with_components(
        remote: Arc<dyn RemoteClient>,
        cache: Arc<dyn ResponseCache>,
        store: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            repository: Arc::new(GhibliRepository::new(remote, cache, store)),
        }
    }

    /// The shared repository.
    #[must_use]
    pub fn repository(&self) -> Arc<GhibliRepository> {
        Arc::clone(&self.repository)
    }

    /// Film list use case.
    #[must_use]
    pub fn get_film_list(&self) -> GetFilmList {
        GetFilmList::new(self.repository())
    }

    /// Film detail use case.
    #[must_use]
    pub fn get_film_detail(&self) -> GetFilmDetail {
        GetFilmDetail::new(self.repository(), self.get_people())
    }

    /// People resolution use case.
    #[must_use]
    pub fn get_people(&self) -> GetPeople {
        GetPeople::new(self.repository())
    }

    /// Filter list use case.
    #[must_use]
    pub fn get_filters(&self) -> GetFilters {
        GetFilters::new(self.repository())
    }

    /// Favorite toggle use case.
    #[must_use]
    pub fn toggle_favorite(&self) -> ToggleFavorite {
        ToggleFavorite::new(self.repository(), self.get_people())
    }

    /// Filter toggle use case.
    #[must_use]
    pub fn toggle_filter(&self) -> ToggleFilter {
        ToggleFilter::new(self.repository())
    }

    /// View switching use case.
    #[must_use]
    pub fn view_films(&self) -> ViewFilms {
        ViewFilms::new(self.repository())
    }

    /// Favorite ids stream use case.
    #[must_use]
    pub fn observe_favorite_films(&self) -> ObserveFavoriteFilms {
        ObserveFavoriteFilms::new(self.repository())
    }

    /// Selected filter ids stream use case.
    #[must_use]
    pub fn observe_filters(&self) -> ObserveFilters {
        ObserveFilters::new(self.repository())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StubRemoteClient;
    use crate::services::fixtures::film;

    #[tokio::test]
    async fn test_with_components_shares_one_repository() {
        let remote = Arc::new(StubRemoteClient::new());
        remote.set_films(Ok(vec![film("f1", "1984", &[])]));
        let container = ServiceContainer::with_components(
            remote.clone(),
            Arc::new(InMemoryCache::new()),
            Arc::new(SqliteLocalStore::in_memory().unwrap()),
        );

        container.get_film_list().execute().await.unwrap();
        container.get_film_list().execute().await.unwrap();
        assert_eq!(remote.calls("get_films"), 1);

        container.toggle_favorite().execute("f1", true).await.unwrap();
        let films = container.get_film_list().execute().await.unwrap();
        assert!(films[0].is_favorite);
    }

    #[test]
    fn test_from_config_opens_store_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = GhibliConfig {
            data_dir: dir.path().join("data"),
            ..GhibliConfig::default()
        };

        let container = ServiceContainer::from_config(&config);
        assert!(container.is_ok());
        assert!(config.database_path().exists());
    }

    #[test]
    fn test_from_config_with_store_keeps_given_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elsewhere.db");
        let store = Arc::new(SqliteLocalStore::open(&path).unwrap());

        let config = GhibliConfig::default();
        let container = ServiceContainer::from_config_with_store(&config, Arc::clone(&store));
        assert!(container.is_ok());
        assert_eq!(Arc::strong_count(&store), 2);
        assert_eq!(store.db_path(), Some(path.as_path()));
    }
}
