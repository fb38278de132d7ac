//! HTTP client for the Studio Ghibli API.
//!
//! API documentation: <https://ghibliapi.vercel.app/>

use super::{FilmRecord, PersonRecord, RemoteClient, SpecieRecord};
use crate::config::ApiConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

/// Remote client backed by `reqwest`.
pub struct HttpRemoteClient {
    /// Base URL without a trailing slash.
    base_url: String,
    /// Page size requested for collection fetches.
    page_limit: u32,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Default API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://ghibliapi.vercel.app";

    /// Default page size for collection fetches.
    pub const DEFAULT_PAGE_LIMIT: u32 = 250;

    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a client for the given API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::OperationFailed {
                operation: "build_http_client".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
            client,
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL of a collection fetch.
    fn collection_url(&self, resource: &str) -> String {
        format!("{}/{resource}?limit={}", self.base_url, self.page_limit)
    }

    /// Builds the URL of a single-item fetch.
    fn item_url(&self, resource: &str, id: &str) -> String {
        format!("{}/{resource}/{id}", self.base_url)
    }

    /// Sends a GET request and decodes the JSON body.
    async fn get<T: DeserializeOwned>(&self, operation: &str, url: String) -> Result<T> {
        let outcome = self.fetch(operation, &url).await;
        let label = if outcome.is_ok() { "success" } else { "failure" };
        metrics::counter!(
            "remote_requests_total",
            "operation" => operation.to_string(),
            "outcome" => label
        )
        .increment(1);
        outcome
    }

    async fn fetch<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| remote_error(operation, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                operation: operation.to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| remote_error(operation, &e))
    }
}

fn remote_error(operation: &str, error: &reqwest::Error) -> Error {
    Error::Remote {
        operation: operation.to_string(),
        cause: error.to_string(),
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    #[instrument(skip(self), fields(operation = "get_films"))]
    async fn get_films(&self) -> Result<Vec<FilmRecord>> {
        self.get("get_films", self.collection_url("films")).await
    }

    #[instrument(skip(self), fields(operation = "get_film"))]
    async fn get_film(&self, id: &str) -> Result<FilmRecord> {
        self.get("get_film", self.item_url("films", id)).await
    }

    #[instrument(skip(self), fields(operation = "get_species"))]
    async fn get_species(&self) -> Result<Vec<SpecieRecord>> {
        self.get("get_species", self.collection_url("species")).await
    }

    #[instrument(skip(self), fields(operation = "get_specie"))]
    async fn get_specie(&self, id: &str) -> Result<SpecieRecord> {
        self.get("get_specie", self.item_url("species", id)).await
    }

    #[instrument(skip(self), fields(operation = "get_people"))]
    async fn get_people(&self) -> Result<Vec<PersonRecord>> {
        self.get("get_people", self.collection_url("people")).await
    }

    #[instrument(skip(self), fields(operation = "get_person"))]
    async fn get_person(&self, id: &str) -> Result<PersonRecord> {
        self.get("get_person", self.item_url("people", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpRemoteClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            page_limit: 50,
            timeout: Duration::from_secs(1),
        };
        HttpRemoteClient::new(&config).expect("build client")
    }

    #[test]
    fn test_urls_use_page_limit_and_strip_trailing_slash() {
        let client = client("https://example.com/api/");
        assert_eq!(client.base_url(), "https://example.com/api");
        assert_eq!(
            client.collection_url("films"),
            "https://example.com/api/films?limit=50"
        );
        assert_eq!(
            client.item_url("people", "p1"),
            "https://example.com/api/people/p1"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_remote_error() {
        let client = client("http://127.0.0.1:9");
        let result = client.get_films().await;
        assert!(matches!(
            result,
            Err(Error::Remote { ref operation, .. }) if operation == "get_films"
        ));
    }
}
