//! Error types returned by the API client.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::http::retry_after_secs;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the client can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The subdomain does not match `^[a-z0-9][a-z0-9-]+[a-z0-9]$`.
    #[error("{0} is invalid subdomain")]
    InvalidSubdomain(String),

    /// The base address could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    AddressParse(#[from] url::ParseError),

    /// A request was issued before a subdomain or endpoint URL was set.
    #[error("no endpoint configured; call set_subdomain or set_endpoint_url first")]
    MissingEndpoint,

    /// A configured header name or value is not valid HTTP.
    #[error("invalid header {0}")]
    InvalidHeader(String),

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Query options could not be serialized.
    #[error("failed to encode query options: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// Connection or I/O failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The governing request context was cancelled.
    #[error("request canceled")]
    Canceled,

    /// The governing request context passed its deadline.
    #[error("request deadline exceeded")]
    Timeout,

    /// The server answered with a status outside the expected success set.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// True for errors raised while configuring the client.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSubdomain(_)
                | Error::AddressParse(_)
                | Error::MissingEndpoint
                | Error::InvalidHeader(_)
        )
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(e) => Some(e.status()),
            _ => None,
        }
    }

    /// Returns the API error, if this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A response whose status was not in the verb's success set.
///
/// The body is kept verbatim; callers decode the service-specific error
/// payload themselves.
#[derive(Debug, Clone)]
pub struct ApiError {
    method: Method,
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiError {
    pub fn new(
        method: Method,
        url: impl Into<String>,
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The server's `Retry-After` hint in whole seconds, when present and numeric.
    pub fn retry_after(&self) -> Option<Duration> {
        retry_after_secs(&self.headers).map(Duration::from_secs)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.url, self.status.as_u16())?;
        if !self.body.is_empty() {
            write!(f, " {}", String::from_utf8_lossy(&self.body))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    fn api_error(status: u16, body: &str, retry_after: Option<&str>) -> ApiError {
        let mut headers = HeaderMap::new();
        if let Some(value) = retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        }
        ApiError::new(
            Method::GET,
            "https://acme.example-service.com/api/v2/tickets.json",
            StatusCode::from_u16(status).unwrap(),
            headers,
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_api_error_display_includes_request_and_body() {
        let err = api_error(404, r#"{"error":"RecordNotFound"}"#, None);
        assert_eq!(
            err.to_string(),
            r#"GET https://acme.example-service.com/api/v2/tickets.json: 404 {"error":"RecordNotFound"}"#
        );
    }

    #[test]
    fn test_api_error_display_without_body() {
        let err = api_error(500, "", None);
        assert!(err.to_string().ends_with(": 500"));
    }

    #[test]
    fn test_api_error_retry_after() {
        assert_eq!(
            api_error(429, "", Some("7")).retry_after(),
            Some(Duration::from_secs(7))
        );
        assert_eq!(api_error(429, "", Some("soon")).retry_after(), None);
        assert_eq!(api_error(429, "", None).retry_after(), None);
    }

    #[test]
    fn test_error_status_and_classification() {
        let err = Error::from(api_error(422, "invalid", None));
        assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.as_api_error().unwrap().body(), b"invalid");
        assert!(!err.is_config_error());

        let err = Error::InvalidSubdomain("-bad".to_string());
        assert!(err.is_config_error());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "-bad is invalid subdomain");
    }

    #[test]
    fn test_canceled_and_timeout_are_distinct() {
        assert_ne!(Error::Canceled.to_string(), Error::Timeout.to_string());
        assert!(!Error::Canceled.is_config_error());
    }
}
