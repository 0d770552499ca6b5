//! Provider types

use std::fmt;

/// Errors that can occur while talking to the imagery service.
///
/// These cover the transport only; HTTP status codes are returned to the
/// caller inside [`super::HttpResponse`] and classified there.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed (connect, timeout, TLS, ...)
    HttpError(String),
    /// Response arrived but its body could not be read
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}
