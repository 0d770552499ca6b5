//! Remote imagery service access
//!
//! This module provides the HTTP client seam used to download panorama tiles
//! and the URL templates for the two tile schemes (legacy and modern).
//!
//! # Example
//!
//! ```ignore
//! use panocache::provider::{AsyncHttpClient, AsyncReqwestClient, TileUrlBuilder};
//!
//! let client = AsyncReqwestClient::new()?;
//! let urls = TileUrlBuilder::default();
//! let url = urls.build(PanoType::Modern, "abc", &TileCoord::new(1, 0, 1));
//! let response = client.get(&url).await?;
//! ```

mod http;
mod types;
mod url;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use types::ProviderError;
pub use url::{TileUrlBuilder, LEGACY_BASE_URL, MODERN_BASE_URL};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
