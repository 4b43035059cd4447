//! Module fetching
//!
//! Downloads module sources and declaration files over HTTP/HTTPS.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while fetching a module
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Content too large
    #[error("Content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: u64, max: u64 },

    /// No source registered for the URL
    #[error("Not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// HTTP status carried by this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Maximum size for a single module (50 MB)
pub const MAX_CONTENT_SIZE: u64 = 50 * 1024 * 1024;

/// HTTP client timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of module text.
///
/// A fetch either yields the full text of the resource or a [`FetchError`].
/// Implementations are shared between concurrently running fetch tasks, so
/// they must be `Send + Sync` and the returned future must be `Send`.
pub trait ModuleFetcher: Send + Sync + 'static {
    /// Fetch the text at `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP module fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_size: u64,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("tsgate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_size: MAX_CONTENT_SIZE,
        })
    }

    /// Create an HTTP fetcher with a custom max size
    pub fn with_max_size(max_size: u64) -> Result<Self, FetchError> {
        let mut fetcher = Self::new()?;
        fetcher.max_size = max_size;
        Ok(fetcher)
    }

    /// Maximum accepted body size in bytes
    pub fn max_size(&self) -> u64 {
        self.max_size
    }
}

impl ModuleFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        validate_url(url)?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(FetchError::ContentTooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        let text = response.text().await?;
        if text.len() as u64 > self.max_size {
            return Err(FetchError::ContentTooLarge {
                size: text.len() as u64,
                max: self.max_size,
            });
        }

        tracing::trace!(url, bytes = text.len(), "downloaded");
        Ok(text)
    }
}

/// Reject anything that is not an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<(), FetchError> {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}
