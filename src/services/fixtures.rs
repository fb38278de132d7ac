//! Shared test fixtures for the use cases.

use crate::api::{FilmRecord, PersonRecord, SpecieRecord, StubRemoteClient};
use crate::repository::GhibliRepository;
use crate::storage::{InMemoryCache, SqliteLocalStore};
use std::sync::Arc;

pub const BASE: &str = "https://ghibliapi.vercel.app";

pub struct Fixture {
    pub remote: Arc<StubRemoteClient>,
    pub repository: Arc<GhibliRepository>,
}

pub fn fixture() -> Fixture {
    let remote = Arc::new(StubRemoteClient::new());
    let store = Arc::new(SqliteLocalStore::in_memory().unwrap());
    let repository = Arc::new(GhibliRepository::new(
        remote.clone(),
        Arc::new(InMemoryCache::new()),
        store,
    ));
    Fixture { remote, repository }
}

pub fn people_ref(id: &str) -> String {
    format!("{BASE}/people/{id}")
}

pub fn film_ref(id: &str) -> String {
    format!("{BASE}/films/{id}")
}

pub fn film(id: &str, release_date: &str, people: &[&str]) -> FilmRecord {
    FilmRecord {
        id: Some(id.to_string()),
        title: Some(format!("Film {id}")),
        description: Some(format!("About {id}")),
        director: Some("Hayao Miyazaki".to_string()),
        producer: Some("Toshio Suzuki".to_string()),
        release_date: Some(release_date.to_string()),
        running_time: Some("120".to_string()),
        rt_score: Some("95".to_string()),
        people_references: Some(people.iter().map(|p| people_ref(p)).collect()),
    }
}

pub fn specie(id: &str, name: &str, films: &[&str]) -> SpecieRecord {
    SpecieRecord {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        film_references: Some(films.iter().map(|f| film_ref(f)).collect()),
    }
}

pub fn person(id: &str, name: &str) -> PersonRecord {
    PersonRecord {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
    }
}
