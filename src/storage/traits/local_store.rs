//! Local store trait.

use crate::Result;
use crate::storage::records::{FavoriteFilmRecord, FavoritePersonRecord, SelectedFilterRecord};
use futures::stream::BoxStream;

/// Durable store for favorites and selected filters.
///
/// Implementations serialize access internally and are safe to share across
/// tasks. Operations are synchronous and short; they never await.
///
/// # Favorite cascade
///
/// Every [`FavoritePersonRecord`] is referenced by at least one
/// [`FavoriteFilmRecord`]. Creating and deleting favorite films maintains the
/// people's `film_ids` back-references inside one transaction.
pub trait LocalStore: Send + Sync {
    /// Upserts `film` and merges `film.id` into each person's `film_ids`.
    ///
    /// The `film_ids` of the given records are unioned with any stored ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing is written then.
    fn create_favorite_film(
        &self,
        film: &FavoriteFilmRecord,
        people: &[FavoritePersonRecord],
    ) -> Result<()>;

    /// Reads one favorite film.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if `id` is not a favorite.
    fn read_favorite_film(&self, id: &str) -> Result<FavoriteFilmRecord>;

    /// Reads all favorite films ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn read_favorite_films(&self) -> Result<Vec<FavoriteFilmRecord>>;

    /// Streams the full favorite film collection, starting with the current one.
    fn observe_favorite_films(&self) -> BoxStream<'static, Vec<FavoriteFilmRecord>>;

    /// Deletes a favorite film and detaches it from its people.
    ///
    /// People left without films are deleted. A collection reference expands
    /// to every stored favorite person.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if `id` is not a favorite.
    fn delete_favorite_film(&self, id: &str) -> Result<()>;

    /// Reads one favorite person.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no favorite film references `id`.
    fn read_favorite_person(&self, id: &str) -> Result<FavoritePersonRecord>;

    /// Reads all favorite people ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn read_favorite_people(&self) -> Result<Vec<FavoritePersonRecord>>;

    /// Upserts a selected filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create_selected_filter(&self, filter: &SelectedFilterRecord) -> Result<()>;

    /// Reads all selected filters ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn read_selected_filters(&self) -> Result<Vec<SelectedFilterRecord>>;

    /// Streams the selected filter collection, starting with the current one.
    fn observe_selected_filters(&self) -> BoxStream<'static, Vec<SelectedFilterRecord>>;

    /// Deletes a selected filter. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_selected_filter(&self, id: &str) -> Result<()>;

    /// Deletes every selected filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_selected_filters(&self) -> Result<()>;
}
