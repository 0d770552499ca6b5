//! Single-tile download with bounded retry and response validation.
//!
//! [`TileFetcher`] turns a challenge and a tile coordinate into a URL, issues
//! the GET through an [`AsyncHttpClient`] and classifies the outcome:
//!
//! | outcome                         | result                       | retried |
//! |---------------------------------|------------------------------|---------|
//! | 2xx, `image/*` or no type       | `Ok(bytes)`                  | -       |
//! | 2xx, other content type         | `InvalidContentType`         | no      |
//! | 400                             | `NotAvailable` (soft)        | no      |
//! | 429, 5xx, transport error       | `Exhausted` after the policy | yes     |
//! | any other status                | `Status`                     | no      |

mod policy;

pub use policy::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error};

use crate::challenge::Challenge;
use crate::provider::{AsyncHttpClient, HttpResponse, ProviderError, TileUrlBuilder};
use crate::pyramid::TileCoord;

/// Why a tile could not be downloaded.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The challenge has no panorama id
    MissingPanorama,
    /// HTTP 400: the tile does not exist upstream
    NotAvailable,
    /// Non-success status that is not worth retrying
    Status(u16),
    /// Success status but the body is not an image
    InvalidContentType(String),
    /// Transport error (single attempt)
    Transport(String),
    /// HTTP 429 or 5xx (single attempt)
    ServerBusy(u16),
    /// Transient failures persisted through every allowed attempt
    Exhausted { attempts: u32, reason: String },
}

impl FetchError {
    /// Soft failures are expected for sparse pyramids and only logged at debug.
    pub fn is_soft(&self) -> bool {
        matches!(self, FetchError::NotAvailable)
    }

    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::ServerBusy(_))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::MissingPanorama => write!(f, "No panorama id"),
            FetchError::NotAvailable => write!(f, "Tile not available (HTTP 400)"),
            FetchError::Status(status) => write!(f, "Unexpected HTTP status {}", status),
            FetchError::InvalidContentType(ct) => write!(f, "Invalid content type: {}", ct),
            FetchError::Transport(msg) => write!(f, "{}", msg),
            FetchError::ServerBusy(status) => write!(f, "Server returned HTTP {}", status),
            FetchError::Exhausted { attempts, reason } => {
                write!(f, "Gave up after {} attempts: {}", attempts, reason)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ProviderError> for FetchError {
    fn from(err: ProviderError) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Downloads individual tiles.
pub struct TileFetcher<C> {
    client: Arc<C>,
    urls: TileUrlBuilder,
    retry: RetryPolicy,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    /// Creates a fetcher with the default URL bases and retry policy.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            urls: TileUrlBuilder::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the URL builder.
    pub fn with_urls(mut self, urls: TileUrlBuilder) -> Self {
        self.urls = urls;
        self
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the retry policy in use.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the URL of one tile of a challenge, if it has a panorama id.
    pub fn tile_url(&self, tile: &TileCoord, challenge: &Challenge) -> Option<String> {
        challenge
            .panorama_id
            .as_deref()
            .map(|pano| self.urls.build(challenge.pano_type, pano, tile))
    }

    /// Downloads one tile.
    ///
    /// Transient failures are retried according to the retry policy; every
    /// other failure is returned immediately.
    pub async fn fetch(&self, tile: &TileCoord, challenge: &Challenge) -> Result<Bytes, FetchError> {
        let url = self
            .tile_url(tile, challenge)
            .ok_or(FetchError::MissingPanorama)?;

        let mut attempt = 1;
        loop {
            match self.attempt(&url).await {
                Ok(body) => {
                    debug!(tile = %tile, attempt, bytes = body.len(), "Tile fetched");
                    return Ok(body);
                }
                Err(e) if e.is_transient() => match self.retry.delay_for_attempt(attempt) {
                    Some(delay) => {
                        debug!(
                            tile = %tile,
                            attempt,
                            error = %e,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying tile fetch"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        let err = FetchError::Exhausted {
                            attempts: attempt,
                            reason: e.to_string(),
                        };
                        error!(tile = %tile, url = %url, error = %err, "Tile fetch failed");
                        return Err(err);
                    }
                },
                Err(FetchError::NotAvailable) => {
                    debug!(tile = %tile, "Tile not available");
                    return Err(FetchError::NotAvailable);
                }
                Err(e) => {
                    error!(tile = %tile, url = %url, error = %e, "Tile fetch failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).await?;
        classify(response)
    }
}

fn classify(response: HttpResponse) -> Result<Bytes, FetchError> {
    match response.status {
        400 => Err(FetchError::NotAvailable),
        429 | 500..=599 => Err(FetchError::ServerBusy(response.status)),
        _ if response.is_success() => match response.content_type.as_deref() {
            None => Ok(response.body),
            Some(ct) if is_image(ct) => Ok(response.body),
            Some(ct) => Err(FetchError::InvalidContentType(ct.to_string())),
        },
        status => Err(FetchError::Status(status)),
    }
}

fn is_image(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
