//! People resolution for a film.

use crate::models::{Person, extract_reference_id, is_collection_reference};
use crate::repository::GhibliRepository;
use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::instrument;

/// Resolves a film's people references to people.
///
/// A collection reference expands to every person. Specific references are
/// looked up concurrently; the batch fails as a whole if any lookup fails and
/// otherwise keeps the reference order.
#[derive(Clone)]
pub struct GetPeople {
    repository: Arc<GhibliRepository>,
}

impl GetPeople {
    /// Creates the use case.
    #[must_use]
    pub const fn new(repository: Arc<GhibliRepository>) -> Self {
        Self { repository }
    }

    /// Resolves `references`.
    ///
    /// With `is_favorite` the people come from the local store, otherwise from
    /// the catalog.
    ///
    /// # Errors
    ///
    /// - [`Error::FavoritesEmpty`] if a specific favorite person lookup fails
    /// - [`Error::ApiFailure`] if a specific catalog person lookup fails
    /// - the underlying failure when expanding a collection reference
    #[instrument(
        skip(self, references),
        fields(operation = "get_people", references = references.len())
    )]
    pub async fn execute(&self, references: &[String], is_favorite: bool) -> Result<Vec<Person>> {
        match (is_collection_reference(references), is_favorite) {
            (true, true) => self.repository.get_favorite_people().await,
            (true, false) => self.repository.get_people().await,
            (false, true) => {
                self.resolve_each(references, Error::FavoritesEmpty, |repository, id| async move {
                    repository.get_favorite_person(&id).await
                })
                .await
            },
            (false, false) => {
                self.resolve_each(references, Error::ApiFailure, |repository, id| async move {
                    repository.get_person(&id).await
                })
                .await
            },
        }
    }

    async fn resolve_each<F, Fut>(
        &self,
        references: &[String],
        failure: Error,
        lookup: F,
    ) -> Result<Vec<Person>>
    where
        F: Fn(Arc<GhibliRepository>, String) -> Fut,
        Fut: Future<Output = Result<Person>> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for (index, reference) in references.iter().enumerate() {
            let id = extract_reference_id(reference).to_string();
            let lookup = lookup(Arc::clone(&self.repository), id);
            tasks.spawn(async move { (index, lookup.await) });
        }

        let mut resolved = Vec::with_capacity(references.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(person))) => resolved.push((index, person)),
                Ok((index, Err(e))) => {
                    tracing::debug!(index, error = %e, "Person lookup failed, abandoning batch");
                    tasks.abort_all();
                    return Err(failure);
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Person lookup task did not complete");
                    tasks.abort_all();
                    return Err(failure);
                },
            }
        }

        resolved.sort_unstable_by_key(|(index, _)| *index);
        Ok(resolved.into_iter().map(|(_, person)| person).collect())
    }
}
