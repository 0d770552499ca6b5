//! Application error types.

use std::fmt;

use crate::challenge::ChallengeError;
use crate::provider::ProviderError;
use crate::reactor::ReactorError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create the HTTP client.
    HttpClient(ProviderError),

    /// The challenge map could not be loaded.
    Challenges(ChallengeError),

    /// The continuous-mode reactor stopped with an error.
    Reactor(ReactorError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Challenges(e) => write!(f, "Failed to load challenges: {}", e),
            AppError::Reactor(e) => write!(f, "Change reactor failed: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::HttpClient(e) => Some(e),
            AppError::Challenges(e) => Some(e),
            AppError::Reactor(e) => Some(e),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::HttpClient(e)
    }
}

impl From<ChallengeError> for AppError {
    fn from(e: ChallengeError) -> Self {
        AppError::Challenges(e)
    }
}

impl From<ReactorError> for AppError {
    fn from(e: ReactorError) -> Self {
        AppError::Reactor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::HttpClient(ProviderError::HttpError("no TLS".to_string()));
        assert_eq!(
            err.to_string(),
            "Failed to create HTTP client: HTTP error: no TLS"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_reactor_error() {
        let err: AppError = ReactorError::Worker("panicked".to_string()).into();
        assert!(matches!(err, AppError::Reactor(_)));
        assert!(err.to_string().contains("panicked"));
    }
}
