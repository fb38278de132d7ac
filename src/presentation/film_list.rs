//! Film list screen model.

use super::{FEEDBACK_CAPACITY, Feedback, ObserverGuard};
use crate::models::{ErrorTag, FilmUiModel, FilterUiModel};
use crate::services::{
    GetFilmList, GetFilters, ObserveFavoriteFilms, ObserveFilters, ServiceContainer,
    ToggleFavorite, ToggleFilter, ViewFilms,
};
use futures::{StreamExt, stream};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// State of the film list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmListState {
    /// A load is in progress.
    pub is_loading: bool,
    /// Classification of the last load failure.
    pub error: Option<ErrorTag>,
    /// Visible films.
    pub films: Vec<FilmUiModel>,
    /// Available filters.
    pub filters: Vec<FilterUiModel>,
}

impl Default for FilmListState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error: None,
            films: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// Film list screen model.
pub struct FilmListModel {
    get_film_list: GetFilmList,
    get_filters: GetFilters,
    toggle_favorite: ToggleFavorite,
    toggle_filter: ToggleFilter,
    view_films: ViewFilms,
    observe_favorites: ObserveFavoriteFilms,
    observe_filters: ObserveFilters,
    state: watch::Sender<FilmListState>,
    feedback: broadcast::Sender<Feedback>,
}

impl FilmListModel {
    /// Creates the model in its loading state.
    #[must_use]
    pub fn new(services: &ServiceContainer) -> Self {
        Self {
            get_film_list: services.get_film_list(),
            get_filters: services.get_filters(),
            toggle_favorite: services.toggle_favorite(),
            toggle_filter: services.toggle_filter(),
            view_films: services.view_films(),
            observe_favorites: services.observe_favorite_films(),
            observe_filters: services.observe_filters(),
            state: watch::Sender::new(FilmListState::default()),
            feedback: broadcast::channel(FEEDBACK_CAPACITY).0,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FilmListState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilmListState> {
        self.state.subscribe()
    }

    /// Receiver of feedback sent after subscribing.
    #[must_use]
    pub fn feedback(&self) -> broadcast::Receiver<Feedback> {
        self.feedback.subscribe()
    }

    /// Resets to the loading state and loads films and filters.
    pub async fn load(&self) {
        self.state.send_replace(FilmListState::default());
        self.reload().await;
    }

    async fn reload(&self) {
        match self.get_film_list.execute().await {
            Ok(films) => self.state.send_modify(|state| {
                state.is_loading = false;
                state.error = None;
                state.films = films;
            }),
            Err(e) => self.state.send_modify(|state| {
                state.is_loading = false;
                state.error = e.tag();
            }),
        }

        if let Ok(filters) = self.get_filters.execute().await {
            self.state.send_modify(|state| state.filters = filters);
        }
    }

    /// Flips the selection of `filter`.
    ///
    /// The list itself refreshes through the filter observer.
    pub async fn toggle_filter(&self, filter: &FilterUiModel) {
        if let Err(e) = self
            .toggle_filter
            .execute(&filter.to_filter(), !filter.is_selected)
            .await
        {
            tracing::warn!(filter_id = %filter.id, error = %e, "Filter toggle failed");
            self.notify(Feedback::FilterFailed);
        }
    }

    /// Favorites or unfavorites film `film_id`.
    pub async fn toggle_favorite(&self, film_id: &str, make_favorite: bool) {
        if let Err(e) = self.toggle_favorite.execute(film_id, make_favorite).await {
            tracing::warn!(film_id, error = %e, "Favorite toggle failed");
            self.notify(Feedback::FavoriteFailed);
        }
    }

    /// Switches to the favorites-only view or back to the full catalog.
    pub async fn view_films(&self, by_favorite: bool) {
        if let Err(e) = self.view_films.execute(by_favorite).await {
            tracing::warn!(by_favorite, error = %e, "View switch failed");
            self.notify(Feedback::FilterFailed);
        }
    }

    /// Reloads whenever the favorites or the selected filters change.
    ///
    /// Both streams feed one task, so reloads never overlap and the last
    /// one to finish reflects the latest change. Each stream also triggers
    /// one reload right away with the current state.
    pub fn spawn_observers(self: &Arc<Self>) -> ObserverGuard {
        let model = Arc::clone(self);
        let mut changes = stream::select(
            self.observe_favorites.execute().map(|_| ()),
            self.observe_filters.execute().map(|_| ()),
        );
        let task = tokio::spawn(async move {
            while changes.next().await.is_some() {
                model.reload().await;
            }
        });

        ObserverGuard::new(vec![task])
    }

    fn notify(&self, feedback: Feedback) {
        // No receivers is fine.
        let _ = self.feedback.send(feedback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StubRemoteClient;
    use crate::services::fixtures::{film, specie};
    use crate::storage::{InMemoryCache, SqliteLocalStore};
    use std::time::Duration;

    fn model() -> (Arc<StubRemoteClient>, Arc<FilmListModel>) {
        let remote = Arc::new(StubRemoteClient::new());
        let services = ServiceContainer::with_components(
            remote.clone(),
            Arc::new(InMemoryCache::new()),
            Arc::new(SqliteLocalStore::in_memory().unwrap()),
        );
        (remote, Arc::new(FilmListModel::new(&services)))
    }

    #[tokio::test]
    async fn test_load_success() {
        let (remote, model) = model();
        remote.set_films(Ok(vec![film("f1", "1995", &[]), film("f2", "1991", &[])]));
        remote.set_species(Ok(vec![specie("s1", "Cat", &["f1"])]));

        assert!(model.state().is_loading);
        model.load().await;

        let state = model.state();
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(state.films.len(), 2);
        assert_eq!(state.filters.len(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_sets_error_tag() {
        let (_, model) = model();
        model.load().await;

        let state = model.state();
        assert!(!state.is_loading);
        assert_eq!(state.error, Some(ErrorTag::Api));
        assert_eq!(state.filters.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_favorite_sends_feedback() {
        let (_, model) = model();
        let mut feedback = model.feedback();

        model.toggle_favorite("missing", false).await;
        assert_eq!(feedback.recv().await.unwrap(), Feedback::FavoriteFailed);
    }

    #[tokio::test]
    async fn test_observers_refresh_after_filter_toggle() {
        let (remote, model) = model();
        remote.set_films(Ok(vec![film("f1", "1995", &[]), film("f2", "1991", &[])]));
        remote.set_species(Ok(vec![specie("s1", "Cat", &["f1"])]));
        model.load().await;
        let _observers = model.spawn_observers();

        let cat = model
            .state()
            .filters
            .into_iter()
            .find(|f| f.id == "s1")
            .unwrap();
        model.toggle_filter(&cat).await;

        let mut states = model.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| {
                state.films.len() == 1
                    && state.filters.iter().any(|f| f.id == "s1" && f.is_selected)
            }),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(state.films[0].id, "f1");
    }

    #[tokio::test]
    async fn test_dropped_observers_stop_refreshing() {
        let (remote, model) = model();
        remote.set_films(Ok(vec![film("f1", "1995", &[])]));
        remote.set_species(Ok(Vec::new()));
        model.load().await;

        let observers = model.spawn_observers();
        model.toggle_favorite("f1", true).await;
        let mut states = model.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| state.films.first().is_some_and(|f| f.is_favorite)),
        )
        .await
        .unwrap()
        .unwrap();

        drop(observers);
        let states = model.subscribe();
        model.toggle_favorite("f1", false).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!states.has_changed().unwrap());
        assert!(model.state().films[0].is_favorite);
    }

    #[tokio::test]
    async fn test_observers_settle_on_latest_change() {
        let (remote, model) = model();
        remote.set_films(Ok(vec![film("f1", "1995", &[]), film("f2", "1991", &[])]));
        remote.set_species(Ok(Vec::new()));
        model.load().await;
        let _observers = model.spawn_observers();

        model.toggle_favorite("f1", true).await;
        model.view_films(true).await;
        model.toggle_favorite("f2", true).await;

        let mut states = model.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| {
                state.films.len() == 2 && state.films.iter().all(|f| f.is_favorite)
            }),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        assert_eq!(state.error, None);
    }
}
