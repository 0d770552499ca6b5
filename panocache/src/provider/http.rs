//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::types::ProviderError;

/// A raw HTTP response.
///
/// Status codes are not interpreted here; the tile fetcher decides which
/// ones count as "not available", "retry" or "give up".
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for async HTTP client operations.
///
/// Implementations must be cheap to share between the concurrent requests
/// of one batch.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response (any status), or an error when no response was received.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

/// Default User-Agent string for HTTP requests.
/// Some tile servers reject requests without one.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new AsyncReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            // One batch opens at most batch_width connections to the same host
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ProviderError::HttpError(format!("Request failed: {}", e)));
            }
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        match response.bytes().await {
            Ok(body) => {
                trace!(url = url, bytes = body.len(), "HTTP response body read");
                Ok(HttpResponse {
                    status,
                    content_type,
                    body,
                })
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ProviderError::InvalidResponse(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Responder = dyn Fn(&str) -> Result<HttpResponse, ProviderError> + Send + Sync;

    /// Mock HTTP client for testing.
    ///
    /// Answers every request through a closure and records the requested URLs.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        responder: Arc<Responder>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        /// Creates a mock answering with the given closure.
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&str) -> Result<HttpResponse, ProviderError> + Send + Sync + 'static,
        {
            Self {
                responder: Arc::new(responder),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Creates a mock answering every request with a small JPEG body.
        pub fn images() -> Self {
            Self::new(|_| Ok(Self::image_response(b"\xFF\xD8jpeg\xFF\xD9")))
        }

        /// Creates a mock answering every request with the given status.
        pub fn status(status: u16) -> Self {
            Self::new(move |_| {
                Ok(HttpResponse {
                    status,
                    content_type: None,
                    body: Bytes::new(),
                })
            })
        }

        /// Builds a 200 `image/jpeg` response.
        pub fn image_response(body: &[u8]) -> HttpResponse {
            HttpResponse {
                status: 200,
                content_type: Some("image/jpeg".to_string()),
                body: Bytes::copy_from_slice(body),
            }
        }

        /// Number of requests made so far.
        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        /// URLs requested so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
            self.calls.lock().push(url.to_string());
            (self.responder)(url)
        }
    }

    #[test]
    fn test_response_is_success() {
        let mut response = MockAsyncHttpClient::image_response(b"x");
        assert!(response.is_success());
        response.status = 400;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_mock_async_client_records_calls() {
        let mock = MockAsyncHttpClient::images();

        let result = mock.get("http://example.com/a").await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().status, 200);
        mock.get("http://example.com/b").await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(
            mock.calls(),
            vec!["http://example.com/a", "http://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_mock_async_client_error() {
        let mock =
            MockAsyncHttpClient::new(|_| Err(ProviderError::HttpError("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_client_builds() {
        assert!(AsyncReqwestClient::with_timeout(5).is_ok());
    }
}
