//! Film detail screen model.

use super::{FEEDBACK_CAPACITY, Feedback, ObserverGuard};
use crate::models::FilmDetailUiModel;
use crate::repository::MISSING_FIELD;
use crate::services::{GetFilmDetail, ObserveFavoriteFilms, ServiceContainer, ToggleFavorite};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Message shown when the film cannot be loaded.
pub const LOAD_FILM_ERROR_MESSAGE: &str = "Failed to load film. Please try again.";

/// State of the film detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmDetailState {
    /// A load is in progress.
    pub is_loading: bool,
    /// Message for a failed load.
    pub error_message: Option<String>,
    /// Screen title.
    pub title: String,
    /// The loaded film.
    pub film: Option<FilmDetailUiModel>,
}

impl Default for FilmDetailState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error_message: None,
            title: MISSING_FIELD.to_string(),
            film: None,
        }
    }
}

/// Film detail screen model.
pub struct FilmDetailModel {
    get_film_detail: GetFilmDetail,
    toggle_favorite: ToggleFavorite,
    observe_favorites: ObserveFavoriteFilms,
    state: watch::Sender<FilmDetailState>,
    feedback: broadcast::Sender<Feedback>,
}

impl FilmDetailModel {
    /// Creates the model in its loading state.
    #[must_use]
    pub fn new(services: &ServiceContainer) -> Self {
        Self {
            get_film_detail: services.get_film_detail(),
            toggle_favorite: services.toggle_favorite(),
            observe_favorites: services.observe_favorite_films(),
            state: watch::Sender::new(FilmDetailState::default()),
            feedback: broadcast::channel(FEEDBACK_CAPACITY).0,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FilmDetailState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilmDetailState> {
        self.state.subscribe()
    }

    /// Receiver of feedback sent after subscribing.
    #[must_use]
    pub fn feedback(&self) -> broadcast::Receiver<Feedback> {
        self.feedback.subscribe()
    }

    /// Loads film `id`.
    pub async fn load(&self, id: &str) {
        self.state.send_replace(FilmDetailState::default());
        let state = match self.get_film_detail.execute(id).await {
            Ok(film) => FilmDetailState {
                is_loading: false,
                error_message: None,
                title: film.title.clone(),
                film: Some(film),
            },
            Err(e) => {
                tracing::warn!(film_id = id, error = %e, "Film detail failed to load");
                FilmDetailState {
                    is_loading: false,
                    error_message: Some(LOAD_FILM_ERROR_MESSAGE.to_string()),
                    ..FilmDetailState::default()
                }
            },
        };
        self.state.send_replace(state);
    }

    /// Favorites or unfavorites film `film_id`.
    pub async fn toggle_favorite(&self, film_id: &str, make_favorite: bool) {
        if let Err(e) = self.toggle_favorite.execute(film_id, make_favorite).await {
            tracing::warn!(film_id, error = %e, "Favorite toggle failed");
            let _ = self.feedback.send(Feedback::FavoriteFailed);
        }
    }

    /// Keeps the loaded film's favorite flag in sync with the local store.
    pub fn spawn_observer(self: &Arc<Self>) -> ObserverGuard {
        let model = Arc::clone(self);
        let mut favorites = self.observe_favorites.execute();
        let task = tokio::spawn(async move {
            while let Some(ids) = favorites.next().await {
                model.state.send_modify(|state| {
                    if let Some(film) = state.film.as_mut() {
                        film.is_favorite = ids.contains(&film.id);
                    }
                });
            }
        });
        ObserverGuard::new(vec![task])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StubRemoteClient;
    use crate::services::fixtures::{film, person};
    use crate::storage::{InMemoryCache, SqliteLocalStore};
    use std::time::Duration;

    fn model() -> (Arc<StubRemoteClient>, Arc<FilmDetailModel>) {
        let remote = Arc::new(StubRemoteClient::new());
        remote.set_films(Ok(vec![film("f1", "2008", &["p1"])]));
        remote.set_people(Ok(vec![person("p1", "Ponyo")]));
        let services = ServiceContainer::with_components(
            remote.clone(),
            Arc::new(InMemoryCache::new()),
            Arc::new(SqliteLocalStore::in_memory().unwrap()),
        );
        (remote, Arc::new(FilmDetailModel::new(&services)))
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (_, model) = model();
        let state = model.state();
        assert!(state.is_loading);
        assert_eq!(state.title, "-");
        assert!(state.film.is_none());
    }

    #[tokio::test]
    async fn test_load() {
        let (_, model) = model();
        model.load("f1").await;

        let state = model.state();
        assert!(!state.is_loading);
        assert_eq!(state.title, "Film f1");
        assert_eq!(state.film.unwrap().people, vec!["Ponyo"]);
    }

    #[tokio::test]
    async fn test_load_failure_message() {
        let (_, model) = model();
        model.load("missing").await;

        let state = model.state();
        assert!(!state.is_loading);
        assert_eq!(state.error_message.as_deref(), Some(LOAD_FILM_ERROR_MESSAGE));
        assert_eq!(state.title, "-");
    }

    #[tokio::test]
    async fn test_observer_tracks_favorite_flag() {
        let (_, model) = model();
        model.load("f1").await;
        let _observer = model.spawn_observer();

        model.toggle_favorite("f1", true).await;

        let mut states = model.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            states.wait_for(|state| state.film.as_ref().is_some_and(|f| f.is_favorite)),
        )
        .await
        .unwrap()
        .unwrap();
    }
}
