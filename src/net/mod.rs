//! HTTP plumbing for the catalog backend.
//!
//! [`HttpClient`] pairs an explicitly constructed `reqwest::Client` with the
//! backend root URL. There is no process-wide client: every catalog binding
//! owns the client it was given, so tests can point one at a mock server.
//!
//! The client never retries. A failed request is reported once and any
//! retry is a fresh, caller-initiated request.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::config::ClientConfig;
//! use hondana::net::HttpClient;
//! use hondana::types::{Manga, Page};
//!
//! # async fn example() -> hondana::Result<()> {
//! let client = HttpClient::new(&ClientConfig::from_env())?;
//! let page: Page<Manga> = client.get_json("list/bestMangas?page=1&per=20").await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// HTTP client bound to one backend root.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Builds a reqwest client from the configuration and binds it to
    /// `config.base_url`.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] - If the base URL does not parse
    /// * [`Error::Network`] - If the TLS backend cannot be initialized
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .gzip(true)
            .brotli(true)
            .build()?;

        Self::with_client(client, &config.base_url)
    }

    /// Binds an existing reqwest client to a backend root.
    ///
    /// ```rust
    /// use hondana::net::HttpClient;
    ///
    /// let client = HttpClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9000/").unwrap();
    /// assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    ///
    /// assert!(HttpClient::with_client(reqwest::Client::new(), "not a url").is_err());
    /// ```
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::validation(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// * [`Error::Source`] - For unsuccessful statuses (4xx, 5xx)
    /// * [`Error::Network`] - For connection errors
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Bytes> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!(endpoint, %status, "catalog request failed");
            return Err(Error::source(endpoint, format!("HTTP {}", status)));
        }

        Ok(response.bytes().await?)
    }

    /// GETs `path` relative to the backend root and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// * All errors from the request itself
    /// * [`Error::Json`] - If the body does not decode into `T`
    pub async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(path, "GET");
        let bytes = self.send(path, self.client.get(self.url(path))).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let request = self.client.post(self.url(path)).json(body);
        let bytes = self.send(path, request).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}
