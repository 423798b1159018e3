//! HTTP client for a JSONPlaceholder-style remote store.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};

use super::{NewRecord, RemoteError, RemoteRecord, RemoteStore, parse_record};

/// Remote store used when none is configured.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com";

const USER_AGENT_VALUE: &str = concat!("markpad/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRemoteStore {
    /// Create a client for the store at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL cannot address records or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Self::with_builder(base_url, reqwest::Client::builder())
    }

    fn with_builder(
        base_url: &str,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, RemoteError> {
        let base_url =
            Url::parse(base_url).map_err(|_| RemoteError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = builder
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the collection, or of one record when `id` is given.
    fn posts_url(&self, id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("posts");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn handle_response(
        response: reqwest::Response,
        id: Option<&str>,
    ) -> Result<RemoteRecord, RemoteError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(id.unwrap_or_default().to_string()));
        }
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_record(&body)
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn create(&self, record: &NewRecord) -> Result<RemoteRecord, RemoteError> {
        let url = self.posts_url(None)?;
        tracing::debug!(%url, bytes = record.body.len(), "creating remote record");

        let payload = serde_json::to_string(record)?;
        let response = self.client.post(url).body(payload).send().await?;
        Self::handle_response(response, None).await
    }

    async fn read_by_id(&self, id: &str) -> Result<RemoteRecord, RemoteError> {
        let url = self.posts_url(Some(id))?;
        tracing::debug!(%url, "fetching remote record");

        let response = self.client.get(url).send().await?;
        Self::handle_response(response, Some(id)).await
    }
}
