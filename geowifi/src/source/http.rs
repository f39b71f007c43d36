//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use super::types::SourceError;

/// Default per-request timeout. Upstream providers are untrusted third
/// parties and some of them hang rather than refuse.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("geowifi/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed request.
///
/// Non-2xx statuses are not errors at this layer: several providers put
/// their error message in the body of a 4xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Shorthand for a 200 response.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, SourceError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Trait for asynchronous HTTP client operations.
///
/// Sources depend on this trait rather than on reqwest directly so that they
/// can be exercised with canned responses.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request with custom headers.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `headers` - Slice of (header_name, header_value) tuples
    fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse, SourceError>> + Send;

    /// Performs an async HTTP POST request with custom headers and a raw body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `headers` - Slice of (header_name, header_value) tuples
    /// * `body` - Request body, sent as-is
    fn post_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, SourceError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `timeout_secs` - Per-request timeout
    /// * `verify_tls` - When false, invalid certificates are accepted
    pub fn with_options(timeout_secs: u64, verify_tls: bool) -> Result<Self, SourceError> {
        if !verify_tls {
            warn!("TLS certificate verification disabled for all sources");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| {
                SourceError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn execute(
        &self,
        method: &'static str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, SourceError> {
        trace!(method, url = url, "HTTP request starting");

        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    method,
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    method,
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(SourceError::HttpError(format!("Request failed: {}", e)));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => {
                trace!(url = url, bytes = body.len(), "HTTP response body read");
                Ok(HttpResponse { status, body })
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(SourceError::HttpError(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute("GET", url, request).await
    }

    async fn post_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, SourceError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute("POST", url, request).await
    }
}
