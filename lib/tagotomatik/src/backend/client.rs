use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    exception::CaseException,
    library::{Album, ScanResult},
};
use tracing::debug;
use url::Url;

use crate::{
    config::AppConfig,
    error::{LibraryError, Result},
    traits::{ExceptionBackend, LibraryBackend},
};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// JSON-over-HTTP client for the local tagging backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    api_key: Option<String>,
    client: Client,
}

#[derive(Default)]
pub struct BackendClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl BackendClientBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let builder = Self::new()
            .base_url(config.backend_url())
            .timeout(config.request_timeout);
        match config.api_key() {
            Some(key) => builder.api_key(key),
            None => builder,
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<BackendClient> {
        let base_url_str = self.base_url.ok_or(LibraryError::NotConfigured)?;
        // A trailing slash keeps `join` from replacing the last path segment.
        let base_url = Url::parse(&format!("{}/", base_url_str.trim_end_matches('/')))?;
        let client = Client::builder()
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            )
            .build()?;

        Ok(BackendClient {
            base_url,
            api_key: self.api_key,
            client,
        })
    }
}

impl BackendClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("api/v1/{endpoint}"))?)
    }

    async fn make_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<B>,
    ) -> Result<T> {
        let url = self.endpoint(endpoint)?;
        debug!("Request: {} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        if let Some(b) = body {
            request = request.json(&b);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            let text = if text.trim().is_empty() { "null" } else { &text };
            serde_json::from_str(text).map_err(|e| LibraryError::Api {
                status: status.as_u16(),
                message: format!("JSON parse error: {e}"),
            })
        } else {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            Err(LibraryError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl LibraryBackend for BackendClient {
    fn id(&self) -> &'static str {
        "http"
    }

    fn name(&self) -> &'static str {
        "HTTP backend"
    }

    async fn scan(&self, path: &str) -> Result<ScanResult> {
        #[derive(Serialize)]
        struct ScanRequest<'a> {
            path: &'a str,
        }
        self.make_request(Method::POST, "scan", Some(ScanRequest { path }))
            .await
    }

    async fn preview_correction(&self, album: Album) -> Result<Album> {
        self.make_request(Method::POST, "albums/preview", Some(album))
            .await
    }

    async fn commit_correction(&self, album: Album) -> Result<Album> {
        self.make_request(Method::POST, "albums/commit", Some(album))
            .await
    }

    async fn persist_album(&self, album: Album) -> Result<Album> {
        self.make_request(Method::POST, "albums/save", Some(album))
            .await
    }

    async fn health_check(&self) -> bool {
        self.make_request::<serde_json::Value, ()>(Method::GET, "health", None)
            .await
            .is_ok()
    }
}

#[async_trait]
impl ExceptionBackend for BackendClient {
    async fn list_exceptions(&self) -> Result<Vec<CaseException>> {
        self.make_request::<Vec<CaseException>, ()>(Method::GET, "exceptions", None)
            .await
    }

    async fn add_exception(&self, exception: CaseException) -> Result<CaseException> {
        self.make_request(Method::POST, "exceptions", Some(exception))
            .await
    }

    async fn delete_exception(&self, id: i64) -> Result<()> {
        let endpoint = format!("exceptions/{id}");
        match self
            .make_request::<serde_json::Value, ()>(Method::DELETE, &endpoint, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(LibraryError::Api { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_a_base_url() {
        let err = BackendClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, LibraryError::NotConfigured));
    }

    #[test]
    fn endpoints_are_nested_under_the_base_path() {
        let client = BackendClientBuilder::new()
            .base_url("http://localhost:9766/backend/")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint("albums/preview").unwrap().as_str(),
            "http://localhost:9766/backend/api/v1/albums/preview"
        );
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = BackendClientBuilder::new()
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, LibraryError::Url(_)));
    }
}
