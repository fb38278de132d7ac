//! Reconciliation of the remote catalog, the response cache and the local store.
//!
//! Catalog reads are read-through: the cache answers when it can, otherwise the
//! remote client is asked and collection results are written back to the cache.
//! Favorites and filters skip the cache and go straight to the local store,
//! whose blocking calls run on the blocking thread pool.
//!
//! Failures surface unchanged; only the use cases reclassify them.

use crate::api::{FilmRecord, PersonRecord, RemoteClient, SpecieRecord};
use crate::models::{Film, Filter, Person, Specie};
use crate::storage::{
    FavoriteFilmRecord, FavoritePersonRecord, LocalStore, ResponseCache, SelectedFilterRecord,
};
use crate::{Error, Result};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// Placeholder for film text fields the catalog left out.
pub const MISSING_FIELD: &str = "-";

/// Single entry point for catalog, favorite and filter data.
#[derive(Clone)]
pub struct GhibliRepository {
    remote: Arc<dyn RemoteClient>,
    cache: Arc<dyn ResponseCache>,
    store: Arc<dyn LocalStore>,
}

impl GhibliRepository {
    /// Creates a repository over the given components.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteClient>,
        cache: Arc<dyn ResponseCache>,
        store: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            remote,
            cache,
            store,
        }
    }

    /// Returns all films, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_films"))]
    pub async fn get_films(&self) -> Result<Vec<Film>> {
        if let Some(films) = self.cache.films() {
            return Ok(films);
        }
        let films: Vec<Film> = self
            .remote
            .get_films()
            .await?
            .into_iter()
            .map(Film::from)
            .collect();
        self.cache.set_films(&films);
        Ok(films)
    }

    /// Returns one film, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_film"))]
    pub async fn get_film(&self, id: &str) -> Result<Film> {
        if let Some(film) = self.cache.film(id) {
            return Ok(film);
        }
        self.remote.get_film(id).await.map(Film::from)
    }

    /// Returns all species, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_species"))]
    pub async fn get_species(&self) -> Result<Vec<Specie>> {
        if let Some(species) = self.cache.species() {
            return Ok(species);
        }
        let species: Vec<Specie> = self
            .remote
            .get_species()
            .await?
            .into_iter()
            .map(Specie::from)
            .collect();
        self.cache.set_species(&species);
        Ok(species)
    }

    /// Returns one specie, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_specie"))]
    pub async fn get_specie(&self, id: &str) -> Result<Specie> {
        if let Some(specie) = self.cache.specie(id) {
            return Ok(specie);
        }
        self.remote.get_specie(id).await.map(Specie::from)
    }

    /// Returns all people, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_people"))]
    pub async fn get_people(&self) -> Result<Vec<Person>> {
        if let Some(people) = self.cache.people() {
            return Ok(people);
        }
        let people: Vec<Person> = self
            .remote
            .get_people()
            .await?
            .into_iter()
            .map(Person::from)
            .collect();
        self.cache.set_people(&people);
        Ok(people)
    }

    /// Returns one person, from the cache or else the remote catalog.
    ///
    /// # Errors
    ///
    /// Returns the remote failure on a cache miss.
    #[instrument(skip(self), fields(operation = "get_person"))]
    pub async fn get_person(&self, id: &str) -> Result<Person> {
        if let Some(person) = self.cache.person(id) {
            return Ok(person);
        }
        self.remote.get_person(id).await.map(Person::from)
    }

    /// Runs a local store call on the blocking thread pool.
    async fn on_store<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LocalStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || work(store.as_ref()))
            .await
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })?
    }

    /// Marks `film` as favorite together with the people appearing in it.
    ///
    /// # Errors
    ///
    /// Returns the local store failure; nothing is written then.
    pub async fn add_favorite_film(&self, film: &Film, people: &[Person]) -> Result<()> {
        let record = FavoriteFilmRecord::from(film);
        let people: Vec<FavoritePersonRecord> = people
            .iter()
            .map(|person| FavoritePersonRecord {
                id: person.id.clone(),
                name: person.name.clone(),
                film_ids: BTreeSet::from([film.id.clone()]),
            })
            .collect();
        self.on_store("add_favorite_film", move |store| {
            store.create_favorite_film(&record, &people)
        })
        .await
    }

    /// Returns the favorite film with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the film is not a favorite.
    pub async fn get_favorite_film(&self, id: &str) -> Result<Film> {
        let id = id.to_string();
        self.on_store("get_favorite_film", move |store| store.read_favorite_film(&id))
            .await
            .map(Film::from)
    }

    /// Returns all favorite films.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    pub async fn get_favorite_films(&self) -> Result<Vec<Film>> {
        let records = self
            .on_store("get_favorite_films", |store| store.read_favorite_films())
            .await?;
        Ok(records.into_iter().map(Film::from).collect())
    }

    /// Streams the favorite films, starting with the current collection.
    #[must_use]
    pub fn observe_favorite_films(&self) -> BoxStream<'static, Vec<Film>> {
        self.store
            .observe_favorite_films()
            .map(|records| records.into_iter().map(Film::from).collect())
            .boxed()
    }

    /// Removes a favorite film and its people back-references.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the film was never a favorite.
    pub async fn remove_favorite_film(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.on_store("remove_favorite_film", move |store| store.delete_favorite_film(&id))
            .await
    }

    /// Returns the favorite person with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no favorite film references `id`.
    pub async fn get_favorite_person(&self, id: &str) -> Result<Person> {
        let id = id.to_string();
        self.on_store("get_favorite_person", move |store| store.read_favorite_person(&id))
            .await
            .map(Person::from)
    }

    /// Returns all favorite people.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    pub async fn get_favorite_people(&self) -> Result<Vec<Person>> {
        let records = self
            .on_store("get_favorite_people", |store| store.read_favorite_people())
            .await?;
        Ok(records.into_iter().map(Person::from).collect())
    }

    /// Activates `filter`.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    pub async fn add_selected_filter(&self, filter: &Filter) -> Result<()> {
        let record = SelectedFilterRecord::from(filter);
        self.on_store("add_selected_filter", move |store| {
            store.create_selected_filter(&record)
        })
        .await
    }

    /// Returns the active filters.
    ///
    /// # Errors
    ///
    /// Returns the local store failure, or [`crate::Error::InvalidInput`] for a
    /// stored filter with an unknown kind.
    pub async fn get_selected_filters(&self) -> Result<Vec<Filter>> {
        self.on_store("get_selected_filters", |store| store.read_selected_filters())
            .await?
            .into_iter()
            .map(Filter::try_from)
            .collect()
    }

    /// Streams the active filters, starting with the current set.
    ///
    /// Stored filters with an unknown kind are skipped.
    #[must_use]
    pub fn observe_selected_filters(&self) -> BoxStream<'static, Vec<Filter>> {
        self.store
            .observe_selected_filters()
            .map(|records| {
                records
                    .into_iter()
                    .filter_map(|record| {
                        Filter::try_from(record)
                            .inspect_err(|e| tracing::warn!(error = %e, "Skipping stored filter"))
                            .ok()
                    })
                    .collect()
            })
            .boxed()
    }

    /// Deactivates the filter with `id`.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    pub async fn remove_selected_filter(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.on_store("remove_selected_filter", move |store| {
            store.delete_selected_filter(&id)
        })
        .await
    }

    /// Deactivates every filter.
    ///
    /// # Errors
    ///
    /// Returns the local store failure.
    pub async fn remove_selected_filters(&self) -> Result<()> {
        self.on_store("remove_selected_filters", |store| store.delete_selected_filters())
            .await
    }
}

fn text_or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING_FIELD.to_string())
}

impl From<FilmRecord> for Film {
    fn from(record: FilmRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            title: text_or_missing(record.title),
            description: text_or_missing(record.description),
            director: text_or_missing(record.director),
            producer: text_or_missing(record.producer),
            release_date: text_or_missing(record.release_date),
            running_time: text_or_missing(record.running_time),
            rt_score: text_or_missing(record.rt_score),
            people_references: record.people_references.unwrap_or_default(),
        }
    }
}

impl From<SpecieRecord> for Specie {
    fn from(record: SpecieRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            name: record.name.unwrap_or_default(),
            film_references: record.film_references.unwrap_or_default(),
        }
    }
}

impl From<PersonRecord> for Person {
    fn from(record: PersonRecord) -> Self {
        Self::new(record.id.unwrap_or_default(), record.name.unwrap_or_default())
    }
}

impl From<&Film> for FavoriteFilmRecord {
    fn from(film: &Film) -> Self {
        Self {
            id: film.id.clone(),
            title: film.title.clone(),
            description: film.description.clone(),
            director: film.director.clone(),
            producer: film.producer.clone(),
            release_date: film.release_date.clone(),
            running_time: film.running_time.clone(),
            rt_score: film.rt_score.clone(),
            people_references: film.people_references.clone(),
        }
    }
}

impl From<FavoriteFilmRecord> for Film {
    fn from(record: FavoriteFilmRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            director: record.director,
            producer: record.producer,
            release_date: record.release_date,
            running_time: record.running_time,
            rt_score: record.rt_score,
            people_references: record.people_references,
        }
    }
}

impl From<FavoritePersonRecord> for Person {
    fn from(record: FavoritePersonRecord) -> Self {
        Self::new(record.id, record.name)
    }
}

impl From<&Filter> for SelectedFilterRecord {
    fn from(filter: &Filter) -> Self {
        Self {
            id: filter.id.clone(),
            name: filter.name.clone(),
            kind: filter.kind.as_str().to_string(),
        }
    }
}

impl TryFrom<SelectedFilterRecord> for Filter {
    type Error = Error;

    fn try_from(record: SelectedFilterRecord) -> Result<Self> {
        Ok(Self {
            kind: record.kind.parse()?,
            id: record.id,
            name: record.name,
        })
    }
}
