//! [`LocalStore`] backed by a single `SQLite` connection.

use super::connection::{acquire_lock, configure_connection, sql_error};
use super::rows;
use crate::models::{extract_reference_id, is_collection_reference};
use crate::storage::records::{FavoriteFilmRecord, FavoritePersonRecord, SelectedFilterRecord};
use crate::storage::traits::LocalStore;
use crate::{Error, Result};
use futures::StreamExt;
use futures::stream::BoxStream;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tracing::instrument;

/// Default period of [`SqliteLocalStore::spawn_external_commit_poller`].
pub const EXTERNAL_COMMIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// `SQLite` local store.
///
/// The connection mutex serializes every operation. After each committed
/// mutation the affected collection is re-read and published to its
/// observers, so subscribers see full snapshots rather than deltas.
///
/// Commits made through other connections to the same file are only seen by
/// observers after [`SqliteLocalStore::sync_external_commits`] runs, usually
/// from the poller task.
pub struct SqliteLocalStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    data_version: AtomicI64,
    favorite_films: watch::Sender<Vec<FavoriteFilmRecord>>,
    selected_filters: watch::Sender<Vec<SelectedFilterRecord>>,
}

impl SqliteLocalStore {
    /// Opens (or creates) the store at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created, or the
    /// schema is newer than this build understands.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(&path).map_err(sql_error("open_local_store"))?;
        configure_connection(&conn);
        tracing::debug!(path = %path.display(), "Opened local store");
        Self::with_connection(conn, Some(path))
    }

    /// Creates a store in memory. Contents are lost on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_error("open_local_store_memory"))?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        rows::initialize(&conn)?;
        let favorite_films = rows::all_films(&conn)?;
        let selected_filters = rows::all_filters(&conn)?;
        let data_version = rows::data_version(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            data_version: AtomicI64::new(data_version),
            favorite_films: watch::Sender::new(favorite_films),
            selected_filters: watch::Sender::new(selected_filters),
        })
    }

    /// Database path, or `None` for an in-memory store.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Republishes both collections if another connection committed since the
    /// last check. Returns whether anything was republished.
    ///
    /// # Errors
    ///
    /// Returns an error if the data version cannot be read.
    pub fn sync_external_commits(&self) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        let version = rows::data_version(&conn)?;
        if self.data_version.swap(version, Ordering::AcqRel) == version {
            return Ok(false);
        }

        self.publish_favorite_films(&conn);
        self.publish_selected_filters(&conn);
        drop(conn);

        tracing::debug!(version, "Picked up commits from another connection");
        Ok(true)
    }

    /// Spawns a task calling [`Self::sync_external_commits`] every `period`.
    ///
    /// The task ends once the store is dropped.
    #[must_use]
    pub fn spawn_external_commit_poller(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                let Some(live) = store.upgrade() else {
                    break;
                };
                match tokio::task::spawn_blocking(move || live.sync_external_commits()).await {
                    Ok(Ok(_)) => {},
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to check for external commits");
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "External commit check did not complete");
                    },
                }
            }
        })
    }

    /// Runs `work` in a transaction and commits it.
    fn transact<T>(
        conn: &mut Connection,
        operation: &'static str,
        work: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let tx = conn.transaction().map_err(sql_error(operation))?;
        let value = work(&tx)?;
        tx.commit().map_err(sql_error(operation))?;
        metrics::counter!("local_store_mutations_total", "operation" => operation).increment(1);
        Ok(value)
    }

    fn publish_favorite_films(&self, conn: &Connection) {
        match rows::all_films(conn) {
            Ok(snapshot) => {
                self.favorite_films.send_replace(snapshot);
            },
            Err(e) => tracing::warn!(error = %e, "Failed to publish favorite films"),
        }
    }

    fn publish_selected_filters(&self, conn: &Connection) {
        match rows::all_filters(conn) {
            Ok(snapshot) => {
                self.selected_filters.send_replace(snapshot);
            },
            Err(e) => tracing::warn!(error = %e, "Failed to publish selected filters"),
        }
    }
}

fn observe<T>(sender: &watch::Sender<T>) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    WatchStream::new(sender.subscribe()).boxed()
}

impl LocalStore for SqliteLocalStore {
    #[instrument(
        skip(self, film, people),
        fields(operation = "create_favorite_film", film_id = %film.id, people = people.len())
    )]
    fn create_favorite_film(
        &self,
        film: &FavoriteFilmRecord,
        people: &[FavoritePersonRecord],
    ) -> Result<()> {
        let mut conn = acquire_lock(&self.conn);
        Self::transact(&mut conn, "create_favorite_film", |tx| {
            rows::upsert_film(tx, film)?;
            for person in people {
                let mut merged = person.clone();
                if let Some(stored) = rows::find_person(tx, &person.id)? {
                    merged.film_ids.extend(stored.film_ids);
                }
                rows::upsert_person(tx, &merged)?;
            }
            Ok(())
        })?;
        self.publish_favorite_films(&conn);
        drop(conn);

        tracing::info!("Stored favorite film");
        Ok(())
    }

    fn read_favorite_film(&self, id: &str) -> Result<FavoriteFilmRecord> {
        let conn = acquire_lock(&self.conn);
        rows::find_film(&conn, id)?.ok_or_else(|| Error::NotFound(format!("favorite film {id}")))
    }

    fn read_favorite_films(&self) -> Result<Vec<FavoriteFilmRecord>> {
        rows::all_films(&acquire_lock(&self.conn))
    }

    fn observe_favorite_films(&self) -> BoxStream<'static, Vec<FavoriteFilmRecord>> {
        observe(&self.favorite_films)
    }

    #[instrument(skip(self), fields(operation = "delete_favorite_film"))]
    fn delete_favorite_film(&self, id: &str) -> Result<()> {
        let mut conn = acquire_lock(&self.conn);
        Self::transact(&mut conn, "delete_favorite_film", |tx| {
            let film = rows::find_film(tx, id)?
                .ok_or_else(|| Error::NotFound(format!("favorite film {id}")))?;
            rows::remove_film(tx, id)?;

            let person_ids: Vec<String> = if is_collection_reference(&film.people_references) {
                rows::all_people(tx)?.into_iter().map(|p| p.id).collect()
            } else {
                film.people_references
                    .iter()
                    .map(|reference| extract_reference_id(reference).to_string())
                    .collect()
            };

            for person_id in person_ids {
                let Some(mut person) = rows::find_person(tx, &person_id)? else {
                    tracing::debug!(person_id, "No favorite person record to detach");
                    continue;
                };
                person.film_ids.remove(id);
                if person.film_ids.is_empty() {
                    rows::remove_person(tx, &person.id)?;
                } else {
                    rows::upsert_person(tx, &person)?;
                }
            }
            Ok(())
        })?;
        self.publish_favorite_films(&conn);
        drop(conn);

        tracing::info!("Removed favorite film");
        Ok(())
    }

    fn read_favorite_person(&self, id: &str) -> Result<FavoritePersonRecord> {
        let conn = acquire_lock(&self.conn);
        rows::find_person(&conn, id)?
            .ok_or_else(|| Error::NotFound(format!("favorite person {id}")))
    }

    fn read_favorite_people(&self) -> Result<Vec<FavoritePersonRecord>> {
        rows::all_people(&acquire_lock(&self.conn))
    }

    #[instrument(
        skip(self, filter),
        fields(operation = "create_selected_filter", filter_id = %filter.id)
    )]
    fn create_selected_filter(&self, filter: &SelectedFilterRecord) -> Result<()> {
        let mut conn = acquire_lock(&self.conn);
        Self::transact(&mut conn, "create_selected_filter", |tx| rows::upsert_filter(tx, filter))?;
        self.publish_selected_filters(&conn);
        drop(conn);

        tracing::info!("Selected filter");
        Ok(())
    }

    fn read_selected_filters(&self) -> Result<Vec<SelectedFilterRecord>> {
        rows::all_filters(&acquire_lock(&self.conn))
    }

    fn observe_selected_filters(&self) -> BoxStream<'static, Vec<SelectedFilterRecord>> {
        observe(&self.selected_filters)
    }

    #[instrument(skip(self), fields(operation = "delete_selected_filter"))]
    fn delete_selected_filter(&self, id: &str) -> Result<()> {
        let mut conn = acquire_lock(&self.conn);
        Self::transact(&mut conn, "delete_selected_filter", |tx| rows::remove_filter(tx, id))?;
        self.publish_selected_filters(&conn);
        drop(conn);

        tracing::info!("Deselected filter");
        Ok(())
    }

    #[instrument(skip(self), fields(operation = "delete_selected_filters"))]
    fn delete_selected_filters(&self) -> Result<()> {
        let mut conn = acquire_lock(&self.conn);
        Self::transact(&mut conn, "delete_selected_filters", |tx| {
            rows::remove_all_filters(tx)
        })?;
        self.publish_selected_filters(&conn);
        drop(conn);

        tracing::info!("Cleared selected filters");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn film(id: &str, people: &[&str]) -> FavoriteFilmRecord {
        FavoriteFilmRecord {
            id: id.to_string(),
            title: format!("title-{id}"),
            description: "-".to_string(),
            director: "-".to_string(),
            producer: "-".to_string(),
            release_date: "1988".to_string(),
            running_time: "86".to_string(),
            rt_score: "93".to_string(),
            people_references: people
                .iter()
                .map(|p| format!("https://ghibliapi.vercel.app/people/{p}"))
                .collect(),
        }
    }

    fn person(id: &str, film_id: &str) -> FavoritePersonRecord {
        FavoritePersonRecord {
            id: id.to_string(),
            name: format!("name-{id}"),
            film_ids: BTreeSet::from([film_id.to_string()]),
        }
    }

    fn film_ids(person: &FavoritePersonRecord) -> Vec<&str> {
        person.film_ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_create_and_delete_cascade() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store
            .create_favorite_film(
                &film("f1", &["p1", "p2"]),
                &[person("p1", "f1"), person("p2", "f1")],
            )
            .unwrap();
        store
            .create_favorite_film(&film("f2", &["p2"]), &[person("p2", "f2")])
            .unwrap();

        assert_eq!(film_ids(&store.read_favorite_person("p2").unwrap()), vec!["f1", "f2"]);

        store.delete_favorite_film("f1").unwrap();

        assert!(matches!(store.read_favorite_film("f1"), Err(Error::NotFound(_))));
        assert!(matches!(store.read_favorite_person("p1"), Err(Error::NotFound(_))));
        assert_eq!(film_ids(&store.read_favorite_person("p2").unwrap()), vec!["f2"]);
    }

    #[test]
    fn test_create_is_idempotent() {
        let store = SqliteLocalStore::in_memory().unwrap();
        for _ in 0..2 {
            store
                .create_favorite_film(&film("f1", &["p1"]), &[person("p1", "f1")])
                .unwrap();
        }

        assert_eq!(store.read_favorite_films().unwrap().len(), 1);
        let people = store.read_favorite_people().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(film_ids(&people[0]), vec!["f1"]);
    }

    #[test]
    fn test_delete_with_collection_reference_detaches_everyone() {
        let store = SqliteLocalStore::in_memory().unwrap();
        let mut all_people = film("f1", &[]);
        all_people.people_references = vec!["https://ghibliapi.vercel.app/people/".to_string()];
        store
            .create_favorite_film(&all_people, &[person("p1", "f1"), person("p2", "f1")])
            .unwrap();
        store
            .create_favorite_film(&film("f2", &["p2"]), &[person("p2", "f2")])
            .unwrap();

        store.delete_favorite_film("f1").unwrap();

        let people = store.read_favorite_people().unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].id, "p2");
        assert_eq!(film_ids(&people[0]), vec!["f2"]);
    }

    #[test]
    fn test_delete_skips_people_without_records() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store
            .create_favorite_film(&film("f1", &["p1", "p2"]), &[person("p1", "f1")])
            .unwrap();

        store.delete_favorite_film("f1").unwrap();
        assert!(store.read_favorite_people().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_film_fails_without_side_effects() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store
            .create_favorite_film(&film("f1", &["p1"]), &[person("p1", "f1")])
            .unwrap();

        assert!(matches!(store.delete_favorite_film("f9"), Err(Error::NotFound(_))));
        assert_eq!(store.read_favorite_films().unwrap().len(), 1);
        assert_eq!(store.read_favorite_people().unwrap().len(), 1);
    }

    #[test]
    fn test_selected_filters() {
        let store = SqliteLocalStore::in_memory().unwrap();
        let filter = SelectedFilterRecord {
            id: "s1".to_string(),
            name: "Cat".to_string(),
            kind: "species".to_string(),
        };
        store.create_selected_filter(&filter).unwrap();
        store.create_selected_filter(&filter).unwrap();
        assert_eq!(store.read_selected_filters().unwrap(), vec![filter]);

        store.delete_selected_filter("missing").unwrap();
        store.delete_selected_filter("s1").unwrap();
        assert!(store.read_selected_filters().unwrap().is_empty());

        store
            .create_selected_filter(&SelectedFilterRecord {
                id: "favorite_id".to_string(),
                name: "Favorite".to_string(),
                kind: "favorite".to_string(),
            })
            .unwrap();
        store.delete_selected_filters().unwrap();
        assert!(store.read_selected_filters().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observe_favorite_films_emits_snapshots() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store
            .create_favorite_film(&film("f1", &[]), &[])
            .unwrap();

        let mut stream = store.observe_favorite_films();
        let first = stream.next().await.unwrap();
        assert_eq!(first.len(), 1);

        store.create_favorite_film(&film("f2", &[]), &[]).unwrap();
        let second = stream.next().await.unwrap();
        assert_eq!(
            second.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
            vec!["f1", "f2"]
        );

        store.delete_favorite_film("f1").unwrap();
        let third = stream.next().await.unwrap();
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].id, "f2");
    }

    #[tokio::test]
    async fn test_observe_selected_filters_starts_from_current_state() {
        let store = SqliteLocalStore::in_memory().unwrap();
        let mut stream = store.observe_selected_filters();
        assert!(stream.next().await.unwrap().is_empty());

        store
            .create_selected_filter(&SelectedFilterRecord {
                id: "s1".to_string(),
                name: "Cat".to_string(),
                kind: "species".to_string(),
            })
            .unwrap();
        assert_eq!(stream.next().await.unwrap().len(), 1);
    }

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("favorites.db");
        {
            let store = SqliteLocalStore::open(&path).unwrap();
            store
                .create_favorite_film(&film("f1", &["p1"]), &[person("p1", "f1")])
                .unwrap();
        }

        let store = SqliteLocalStore::open(&path).unwrap();
        assert_eq!(store.db_path(), Some(path.as_path()));
        assert_eq!(store.read_favorite_film("f1").unwrap(), film("f1", &["p1"]));
        assert_eq!(store.read_favorite_person("p1").unwrap(), person("p1", "f1"));
    }

    #[test]
    fn test_failed_create_rolls_back_film_and_people() {
        let store = SqliteLocalStore::in_memory().unwrap();
        acquire_lock(&store.conn)
            .execute_batch(
                "CREATE TRIGGER reject_p2 BEFORE INSERT ON favorite_people
                 WHEN NEW.id = 'p2'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store.create_favorite_film(
            &film("f1", &["p1", "p2"]),
            &[person("p1", "f1"), person("p2", "f1")],
        );

        assert!(matches!(result, Err(Error::OperationFailed { .. })));
        assert!(store.read_favorite_films().unwrap().is_empty());
        assert!(store.read_favorite_people().unwrap().is_empty());
    }

    #[test]
    fn test_failed_delete_rolls_back_cascade() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store
            .create_favorite_film(
                &film("f1", &["p2", "p1"]),
                &[person("p1", "f1"), person("p2", "f1")],
            )
            .unwrap();
        store
            .create_favorite_film(&film("f2", &["p2"]), &[person("p2", "f2")])
            .unwrap();
        acquire_lock(&store.conn)
            .execute_batch(
                "CREATE TRIGGER keep_p1 BEFORE DELETE ON favorite_people
                 WHEN OLD.id = 'p1'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store.delete_favorite_film("f1");

        assert!(matches!(result, Err(Error::OperationFailed { .. })));
        assert_eq!(store.read_favorite_films().unwrap().len(), 2);
        assert_eq!(film_ids(&store.read_favorite_person("p1").unwrap()), vec!["f1"]);
        assert_eq!(film_ids(&store.read_favorite_person("p2").unwrap()), vec!["f1", "f2"]);
    }

    #[tokio::test]
    async fn test_sync_external_commits_republishes_other_connection_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.db");
        let watcher = SqliteLocalStore::open(&path).unwrap();
        let writer = SqliteLocalStore::open(&path).unwrap();
        watcher.sync_external_commits().unwrap();

        let mut stream = watcher.observe_favorite_films();
        assert!(stream.next().await.unwrap().is_empty());
        assert!(!watcher.sync_external_commits().unwrap());

        writer.create_favorite_film(&film("f1", &[]), &[]).unwrap();

        assert!(watcher.sync_external_commits().unwrap());
        let snapshot = stream.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "f1");
        assert!(!watcher.sync_external_commits().unwrap());
    }

    #[tokio::test]
    async fn test_own_commits_do_not_trigger_external_sync() {
        let store = SqliteLocalStore::in_memory().unwrap();
        store.create_favorite_film(&film("f1", &[]), &[]).unwrap();
        assert!(!store.sync_external_commits().unwrap());
    }

    #[tokio::test]
    async fn test_poller_delivers_other_connection_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.db");
        let watcher = Arc::new(SqliteLocalStore::open(&path).unwrap());
        let writer = SqliteLocalStore::open(&path).unwrap();
        watcher.sync_external_commits().unwrap();
        let poller = watcher.spawn_external_commit_poller(Duration::from_millis(20));

        let mut stream = watcher.observe_selected_filters();
        assert!(stream.next().await.unwrap().is_empty());

        writer
            .create_selected_filter(&SelectedFilterRecord {
                id: "s1".to_string(),
                name: "Cat".to_string(),
                kind: "species".to_string(),
            })
            .unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.len(), 1);

        drop(watcher);
        tokio::time::timeout(Duration::from_secs(2), poller)
            .await
            .unwrap()
            .unwrap();
    }
}
