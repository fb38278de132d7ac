//! Framework-neutral screen models.
//!
//! Each model owns a `watch` channel with the current screen state and a
//! `broadcast` channel of one-shot [`Feedback`] notifications. Observers keep
//! the state in sync with local store changes while their [`ObserverGuard`]
//! is alive.

mod film_detail;
mod film_list;

pub use film_detail::{FilmDetailModel, FilmDetailState, LOAD_FILM_ERROR_MESSAGE};
pub use film_list::{FilmListModel, FilmListState};

use crate::models::ErrorTag;
use tokio::task::JoinHandle;

/// Capacity of the feedback channel. Slow receivers lose the oldest items.
const FEEDBACK_CAPACITY: usize = 16;

/// A recoverable action failure to show transiently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Favoriting or unfavoriting a film failed.
    FavoriteFailed,
    /// Selecting, deselecting or switching filters failed.
    FilterFailed,
}

impl Feedback {
    /// Message classification for the notification.
    #[must_use]
    pub const fn tag(self) -> ErrorTag {
        match self {
            Self::FavoriteFailed => ErrorTag::Favorite,
            Self::FilterFailed => ErrorTag::Api,
        }
    }
}

/// Background observer tasks, aborted on drop.
#[must_use = "observers stop when the guard is dropped"]
pub struct ObserverGuard {
    tasks: Vec<JoinHandle<()>>,
}

impl ObserverGuard {
    fn new(tasks: Vec<JoinHandle<()>>) -> Self {
        Self { tasks }
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
