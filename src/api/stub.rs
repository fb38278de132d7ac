//! In-process remote client.
//!
//! Serves configured responses instead of talking to the network and counts
//! the calls it receives. Used by tests and for running the client offline
//! against a fixed catalog.

use super::{FilmRecord, PersonRecord, RemoteClient, SpecieRecord};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct StubState {
    films: Option<Result<Vec<FilmRecord>>>,
    species: Option<Result<Vec<SpecieRecord>>>,
    people: Option<Result<Vec<PersonRecord>>>,
    failing_ids: HashSet<String>,
    calls: HashMap<&'static str, usize>,
}

/// Remote client serving configured responses.
///
/// Collection responses are set per entity type. Single-item fetches look the id
/// up in the configured collection and fail with a 404-style
/// [`Error::Remote`] when it is absent, when no collection is configured, or when
/// the id was marked with [`StubRemoteClient::fail_id`].
#[derive(Default)]
pub struct StubRemoteClient {
    state: Mutex<StubState>,
}

impl StubRemoteClient {
    /// Creates a stub where every operation fails until configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the film collection response.
    pub fn set_films(&self, response: Result<Vec<FilmRecord>>) {
        self.lock().films = Some(response);
    }

    /// Sets the species collection response.
    pub fn set_species(&self, response: Result<Vec<SpecieRecord>>) {
        self.lock().species = Some(response);
    }

    /// Sets the people collection response.
    pub fn set_people(&self, response: Result<Vec<PersonRecord>>) {
        self.lock().people = Some(response);
    }

    /// Makes single-item fetches of `id` fail for every entity type.
    pub fn fail_id(&self, id: impl Into<String>) {
        self.lock().failing_ids.insert(id.into());
    }

    /// Returns how many times `operation` (e.g. `"get_films"`) was called.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, operation: &'static str) -> MutexGuard<'_, StubState> {
        let mut state = self.lock();
        *state.calls.entry(operation).or_insert(0) += 1;
        state
    }
}

fn unconfigured(operation: &str) -> Error {
    Error::Remote {
        operation: operation.to_string(),
        cause: "no response configured".to_string(),
    }
}

fn not_found(operation: &str, id: &str) -> Error {
    Error::Remote {
        operation: operation.to_string(),
        cause: format!("API returned status: 404 Not Found - {id}"),
    }
}

fn collection<T: Clone>(
    response: Option<&Result<Vec<T>>>,
    operation: &'static str,
) -> Result<Vec<T>> {
    response.cloned().unwrap_or_else(|| Err(unconfigured(operation)))
}

fn item<T: Clone>(
    response: Option<&Result<Vec<T>>>,
    failing_ids: &HashSet<String>,
    operation: &'static str,
    id: &str,
    id_of: impl Fn(&T) -> Option<&str>,
) -> Result<T> {
    if failing_ids.contains(id) {
        return Err(not_found(operation, id));
    }
    match response {
        Some(Ok(items)) => items
            .iter()
            .find(|candidate| id_of(candidate) == Some(id))
            .cloned()
            .ok_or_else(|| not_found(operation, id)),
        Some(Err(error)) => Err(error.clone()),
        None => Err(unconfigured(operation)),
    }
}

#[async_trait]
impl RemoteClient for StubRemoteClient {
    async fn get_films(&self) -> Result<Vec<FilmRecord>> {
        let state = self.record_call("get_films");
        collection(state.films.as_ref(), "get_films")
    }

    async fn get_film(&self, id: &str) -> Result<FilmRecord> {
        let state = self.record_call("get_film");
        item(state.films.as_ref(), &state.failing_ids, "get_film", id, |film| {
            film.id.as_deref()
        })
    }

    async fn get_species(&self) -> Result<Vec<SpecieRecord>> {
        let state = self.record_call("get_species");
        collection(state.species.as_ref(), "get_species")
    }

    async fn get_specie(&self, id: &str) -> Result<SpecieRecord> {
        let state = self.record_call("get_specie");
        item(
            state.species.as_ref(),
            &state.failing_ids,
            "get_specie",
            id,
            |specie| specie.id.as_deref(),
        )
    }

    async fn get_people(&self) -> Result<Vec<PersonRecord>> {
        let state = self.record_call("get_people");
        collection(state.people.as_ref(), "get_people")
    }

    async fn get_person(&self, id: &str) -> Result<PersonRecord> {
        let state = self.record_call("get_person");
        item(
            state.people.as_ref(),
            &state.failing_ids,
            "get_person",
            id,
            |person| person.id.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> PersonRecord {
        PersonRecord {
            id: Some(id.to_string()),
            name: Some(format!("name-{id}")),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_operations_fail() {
        let stub = StubRemoteClient::new();
        assert!(stub.get_films().await.is_err());
        assert!(stub.get_person("p1").await.is_err());
        assert_eq!(stub.calls("get_films"), 1);
        assert_eq!(stub.calls("get_person"), 1);
        assert_eq!(stub.calls("get_species"), 0);
    }

    #[tokio::test]
    async fn test_item_lookup_uses_collection() {
        let stub = StubRemoteClient::new();
        stub.set_people(Ok(vec![person("p1"), person("p2")]));

        assert_eq!(stub.get_person("p2").await, Ok(person("p2")));
        assert!(stub.get_person("p3").await.is_err());

        stub.fail_id("p1");
        assert!(stub.get_person("p1").await.is_err());
    }
}
