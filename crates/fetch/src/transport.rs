//! Transport seam: the rest of govm only ever asks for "the bytes at this
//! URL", so resolution and installation logic can be exercised against an
//! in-memory transport in tests.

use async_trait::async_trait;
use bytes::Bytes;
use govm_core::{Error, Result};
use tracing::debug;

/// Fetches bytes from a URL. Any non-success response is an error; the
/// caller decides whether that is fatal or a reason to try a mirror.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Retrieve the full body at `url`.
    async fn get(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed transport used by the real CLI.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with govm's user agent.
    ///
    /// # Panics
    ///
    /// `reqwest::Client::builder().build()` only fails when the TLS backend
    /// cannot initialize, which is a broken environment rather than a
    /// recoverable condition.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("govm/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("failed to initialize TLS backend for HTTP client"),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Bytes> {
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))
    }
}

/// In-memory transport for tests: a fixed url → body map, with a counter so
/// tests can assert how many network round trips happened.
#[derive(Default)]
pub struct MockTransport {
    responses: std::collections::HashMap<String, Bytes>,
    requests: std::sync::atomic::AtomicUsize,
}

impl MockTransport {
    /// Create an empty mock; every request 404s.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    /// Number of requests made so far, including failed ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Bytes> {
        self.requests
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::fetch(url, "HTTP 404 Not Found"))
    }
}
