use crate::util::HostLimiter;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Error body the service returns with HTTP 200 when a page is too large to
/// render. Must be detected on the raw body, not the status code.
const MEMORY_ERROR_BODY: &[u8] = b"Liquid error: Memory limits exceeded";

/// Errors that can occur during a single feed page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a status other than 200
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),
    /// Service-side memory failure embedded in a 200 response body
    #[error("memory limits exceeded at {0}")]
    MemoryLimits(String),
    /// Response body exceeded the size limit
    #[error("response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
}

/// HTTP transport shared by every metadata and page fetch.
///
/// Bundles the reqwest client with the per-host request limiter and the
/// request timeout, so components receive one handle instead of three
/// globals. Cloning is cheap; all clones share the limiter.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    limiter: HostLimiter,
    timeout: Duration,
}

impl FeedClient {
    /// Builds a client capping simultaneous requests per host at
    /// `max_concurrent_requests`.
    pub fn new(max_concurrent_requests: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("feedprobe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            limiter: HostLimiter::new(max_concurrent_requests),
            timeout,
        })
    }

    /// One GET against the feed endpoint, returning the raw body.
    ///
    /// The per-host permit is held for the full round trip, body read
    /// included. Exactly one attempt: a failure here is a signal to the
    /// caller, not something to retry.
    pub async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let host = url.host_str().unwrap_or_default().to_owned();
        let _permit = self.limiter.acquire(&host).await;

        let response = tokio::time::timeout(self.timeout, self.http.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout.as_secs()))?
            .map_err(FetchError::Network)?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;

        if bytes.as_slice() == MEMORY_ERROR_BODY {
            return Err(FetchError::MemoryLimits(url.to_string()));
        }

        Ok(bytes)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length before reading anything
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
