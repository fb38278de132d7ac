//! Film detail assembly.

use super::people::GetPeople;
use crate::models::FilmDetailUiModel;
use crate::repository::GhibliRepository;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::instrument;

/// Builds the detail view of one film.
///
/// The favorite record wins over the catalog. People come from the local store
/// for favorites and from the catalog otherwise; if they cannot be resolved the
/// detail is still returned with no people.
#[derive(Clone)]
pub struct GetFilmDetail {
    repository: Arc<GhibliRepository>,
    get_people: GetPeople,
}

impl GetFilmDetail {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>, get_people: GetPeople) -> Self {
        Self {
            repository,
            get_people,
        }
    }

    /// Returns the detail of film `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiFailure`] if the film is neither a favorite nor
    /// available from the catalog.
    #[instrument(skip(self), fields(operation = "get_film_detail"))]
    pub async fn execute(&self, id: &str) -> Result<FilmDetailUiModel> {
        let favorite = self.repository.get_favorite_film(id).await;
        let is_favorite = favorite.is_ok();
        let film = match favorite {
            Ok(film) => film,
            Err(_) => self.repository.get_film(id).await.map_err(|e| {
                tracing::warn!(error = %e, "Film unavailable");
                Error::ApiFailure
            })?,
        };

        let people = self
            .get_people
            .execute(&film.people_references, is_favorite)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Showing film without people");
                Vec::new()
            })
            .into_iter()
            .map(|person| person.name)
            .collect();

        Ok(FilmDetailUiModel {
            id: film.id,
            title: film.title,
            description: film.description,
            director: film.director,
            producer: film.producer,
            release_date: film.release_date,
            running_time: film.running_time,
            rt_score: film.rt_score,
            people,
            is_favorite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Film, Person};
    use crate::services::fixtures::{film, fixture, person};

    fn use_case(repository: &Arc<GhibliRepository>) -> GetFilmDetail {
        GetFilmDetail::new(
            Arc::clone(repository),
            GetPeople::new(Arc::clone(repository)),
        )
    }

    #[tokio::test]
    async fn test_catalog_film_detail() {
        let fx = fixture();
        fx.remote.set_films(Ok(vec![film("f1", "1988", &["p1", "p2"])]));
        fx.remote
            .set_people(Ok(vec![person("p1", "Satsuki"), person("p2", "Mei")]));

        let detail = use_case(&fx.repository).execute("f1").await.unwrap();
        assert_eq!(detail.id, "f1");
        assert_eq!(detail.release_date, "1988");
        assert_eq!(detail.people, vec!["Satsuki", "Mei"]);
        assert!(!detail.is_favorite);
    }

    #[tokio::test]
    async fn test_favorite_detail_uses_local_store() {
        let fx = fixture();
        fx.remote.set_films(Ok(vec![film("f1", "1988", &["p1"])]));
        let favorite = Film::from(film("f1", "1988", &["p1"]));
        fx.repository
            .add_favorite_film(&favorite, &[Person::new("p1", "Satsuki")])
            .await
            .unwrap();

        let detail = use_case(&fx.repository).execute("f1").await.unwrap();
        assert!(detail.is_favorite);
        assert_eq!(detail.people, vec!["Satsuki"]);
        assert_eq!(fx.remote.calls("get_film"), 0);
        assert_eq!(fx.remote.calls("get_person"), 0);
    }

    #[tokio::test]
    async fn test_people_failure_yields_empty_people() {
        let fx = fixture();
        fx.remote.set_films(Ok(vec![film("f1", "1988", &["p1"])]));

        let detail = use_case(&fx.repository).execute("f1").await.unwrap();
        assert!(detail.people.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_film_is_api_failure() {
        let fx = fixture();
        fx.remote.set_films(Ok(vec![film("f1", "1988", &[])]));

        let result = use_case(&fx.repository).execute("f9").await;
        assert_eq!(result, Err(Error::ApiFailure));
    }
}
