//! Process-lifetime response cache.
//!
//! A read-through optimization in front of the remote catalog. A miss, including
//! an empty collection, means "ask the remote", never "there is no data".
//! Entries are upserted by id and never evicted.

use crate::models::{Film, Person, Specie};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Cache of catalog responses.
pub trait ResponseCache: Send + Sync {
    /// Returns all cached films, or `None` if none are cached.
    fn films(&self) -> Option<Vec<Film>>;
    /// Returns the cached film with `id`.
    fn film(&self, id: &str) -> Option<Film>;
    /// Upserts films by id.
    fn set_films(&self, films: &[Film]);

    /// Returns all cached species, or `None` if none are cached.
    fn species(&self) -> Option<Vec<Specie>>;
    /// Returns the cached specie with `id`.
    fn specie(&self, id: &str) -> Option<Specie>;
    /// Upserts species by id.
    fn set_species(&self, species: &[Specie]);

    /// Returns all cached people, or `None` if none are cached.
    fn people(&self) -> Option<Vec<Person>>;
    /// Returns the cached person with `id`.
    fn person(&self, id: &str) -> Option<Person>;
    /// Upserts people by id.
    fn set_people(&self, people: &[Person]);
}

/// Entries keyed by id, remembering first-insertion order.
struct Table<T> {
    entity: &'static str,
    order: Vec<String>,
    entries: HashMap<String, T>,
}

impl<T: Clone> Table<T> {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    fn all(&self) -> Option<Vec<T>> {
        let hit = !self.entries.is_empty();
        record(self.entity, hit);
        hit.then(|| {
            self.order
                .iter()
                .filter_map(|id| self.entries.get(id).cloned())
                .collect()
        })
    }

    fn get(&self, id: &str) -> Option<T> {
        let entry = self.entries.get(id).cloned();
        record(self.entity, entry.is_some());
        entry
    }

    fn upsert<'a>(&mut self, items: impl IntoIterator<Item = (&'a str, T)>) {
        for (id, item) in items {
            if self.entries.insert(id.to_string(), item).is_none() {
                self.order.push(id.to_string());
            }
        }
    }
}

fn record(entity: &'static str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    tracing::debug!(entity, outcome, "cache lookup");
    metrics::counter!("cache_requests_total", "entity" => entity, "outcome" => outcome)
        .increment(1);
}

/// In-memory [`ResponseCache`] guarded by one lock per entity type.
pub struct InMemoryCache {
    films: RwLock<Table<Film>>,
    species: RwLock<Table<Specie>>,
    people: RwLock<Table<Person>>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self {
            films: RwLock::new(Table::new("film")),
            species: RwLock::new(Table::new("specie")),
            people: RwLock::new(Table::new("person")),
        }
    }
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseCache for InMemoryCache {
    fn films(&self) -> Option<Vec<Film>> {
        self.films.read().unwrap_or_else(PoisonError::into_inner).all()
    }

    fn film(&self, id: &str) -> Option<Film> {
        self.films.read().unwrap_or_else(PoisonError::into_inner).get(id)
    }

    fn set_films(&self, films: &[Film]) {
        self.films
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .upsert(films.iter().map(|film| (film.id.as_str(), film.clone())));
    }

    fn species(&self) -> Option<Vec<Specie>> {
        self.species.read().unwrap_or_else(PoisonError::into_inner).all()
    }

    fn specie(&self, id: &str) -> Option<Specie> {
        self.species.read().unwrap_or_else(PoisonError::into_inner).get(id)
    }

    fn set_species(&self, species: &[Specie]) {
        self.species
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .upsert(species.iter().map(|specie| (specie.id.as_str(), specie.clone())));
    }

    fn people(&self) -> Option<Vec<Person>> {
        self.people.read().unwrap_or_else(PoisonError::into_inner).all()
    }

    fn person(&self, id: &str) -> Option<Person> {
        self.people.read().unwrap_or_else(PoisonError::into_inner).get(id)
    }

    fn set_people(&self, people: &[Person]) {
        self.people
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .upsert(people.iter().map(|person| (person.id.as_str(), person.clone())));
    }
}
