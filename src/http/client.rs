//! API client: request building, rate-limit aware dispatch and response
//! classification.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::retry::{DispatchState, RetryPolicy};
use crate::context::RequestContext;
use crate::credential::Credential;
use crate::endpoint;
use crate::error::{ApiError, Error, Result};

/// Value of the default `User-Agent` header.
pub const USER_AGENT: &str = concat!("deskapi/", env!("DESKAPI_VERSION"));

const GET_SUCCESS: &[StatusCode] = &[StatusCode::OK];
const POST_SUCCESS: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
const PUT_SUCCESS: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];
const DELETE_SUCCESS: &[StatusCode] = &[StatusCode::NO_CONTENT];

/// Verb operations used by endpoint modules.
///
/// [`Client`] implements this; endpoint code that depends on the trait can
/// be tested against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BaseApi: Send + Sync {
    async fn get(&self, ctx: &RequestContext, path: &str) -> Result<Vec<u8>>;
    async fn post(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>>;
    async fn put(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>>;
    async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<()>;
}

/// Client for the tenant REST API.
///
/// Configure it through the setters, then share it (`&Client` or
/// `Arc<Client>`) between tasks; request execution only reads the
/// configuration.
#[derive(Clone)]
pub struct Client {
    base_url: Option<Url>,
    http: reqwest::Client,
    credential: Option<Arc<dyn Credential>>,
    // keyed by lowercase header name
    headers: HashMap<String, String>,
    policy: RetryPolicy,
}

/// Result of one attempt.
struct Outcome {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Client {
    /// Creates a client on top of the given transport.
    pub fn new(http: reqwest::Client) -> Self {
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), USER_AGENT.to_string());
        headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            base_url: None,
            http,
            credential: None,
            headers,
            policy: RetryPolicy::default(),
        }
    }

    /// Sets a header sent with every request, replacing any earlier value.
    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.insert(key.to_ascii_lowercase(), value.to_string());
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    /// Points the client at `https://{subdomain}.example-service.com/api/v2`.
    ///
    /// An invalid subdomain leaves the current base URL untouched.
    pub fn set_subdomain(&mut self, subdomain: &str) -> Result<()> {
        self.base_url = Some(endpoint::subdomain_url(subdomain)?);
        Ok(())
    }

    /// Replaces the base URL without subdomain validation, mainly to point
    /// the client at a mock server.
    pub fn set_endpoint_url(&mut self, url: &str) -> Result<()> {
        self.base_url = Some(endpoint::parse_endpoint_url(url)?);
        Ok(())
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn set_credential(&mut self, credential: Arc<dyn Credential>) {
        self.credential = Some(credential);
    }

    /// Longest `Retry-After` the client will sleep for on a 429. Defaults to 5 seconds.
    pub fn set_max_retry_sleep_delay(&mut self, duration: Duration) {
        self.policy.max_sleep = duration;
    }

    pub fn max_retry_sleep_delay(&self) -> Duration {
        self.policy.max_sleep
    }

    /// Total attempts per request when throttled. Defaults to 3; values
    /// `<= 0` are ignored.
    pub fn set_max_retry(&mut self, retries: i64) {
        if retries > 0 {
            self.policy.max_retry = retries as usize;
        }
    }

    pub fn max_retry(&self) -> usize {
        self.policy.max_retry
    }

    /// Fetches `path` and returns the raw response body.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &RequestContext, path: &str) -> Result<Vec<u8>> {
        self.exec_request(ctx, Method::GET, path, None, GET_SUCCESS)
            .await
    }

    /// Sends `data` as JSON and returns the raw response body.
    #[tracing::instrument(skip(self, ctx, data))]
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &T,
    ) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(data)?;
        self.exec_request(ctx, Method::POST, path, Some(body), POST_SUCCESS)
            .await
    }

    /// Sends `data` as JSON and returns the raw response body.
    #[tracing::instrument(skip(self, ctx, data))]
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &T,
    ) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(data)?;
        self.exec_request(ctx, Method::PUT, path, Some(body), PUT_SUCCESS)
            .await
    }

    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<()> {
        self.exec_request(ctx, Method::DELETE, path, None, DELETE_SUCCESS)
            .await?;
        Ok(())
    }

    async fn exec_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        success: &[StatusCode],
    ) -> Result<Vec<u8>> {
        let base_url = self.base_url.as_ref().ok_or(Error::MissingEndpoint)?;
        let url = endpoint::join(base_url, path);
        let headers = self.request_headers()?;

        let mut attempts = 0;
        let mut state = DispatchState::Attempting;
        let outcome = loop {
            if let DispatchState::ThrottledRetry(delay) = state {
                ctx.sleep(delay).await?;
            }

            debug!("{} {} (attempt {}/{})", method, url, attempts + 1, self.policy.max_retry);
            let outcome = ctx
                .run(self.send_once(&method, &url, &headers, body.as_deref()))
                .await?;
            attempts += 1;

            state = self.policy.next_state(attempts, outcome.status, &outcome.headers);
            match state {
                DispatchState::ThrottledRetry(delay) => {
                    warn!(
                        "{} {}: rate limited (attempt {}/{}), retrying in {}s...",
                        method,
                        url,
                        attempts,
                        self.policy.max_retry,
                        delay.as_secs()
                    );
                }
                _ => break outcome,
            }
        };

        if success.contains(&outcome.status) {
            return Ok(outcome.body);
        }

        debug!("{} {}: unexpected status {}", method, url, outcome.status);
        Err(ApiError::new(method, url, outcome.status, outcome.headers, outcome.body).into())
    }

    /// Sends one request and reads its whole body.
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<Outcome> {
        let mut request = self.http.request(method.clone(), url).headers(headers.clone());
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = self.authorize(request).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Outcome {
            status,
            headers,
            body,
        })
    }

    /// Converts the configured headers into a `HeaderMap`.
    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| Error::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }
        // the credential owns the Authorization header when one is set
        if self.credential.is_some() {
            headers.remove(AUTHORIZATION);
        }
        Ok(headers)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(credential) if credential.is_bearer() => request.bearer_auth(credential.secret()),
            Some(credential) => request.basic_auth(credential.email(), Some(credential.secret())),
            None => request,
        }
    }
}

#[async_trait]
impl BaseApi for Client {
    async fn get(&self, ctx: &RequestContext, path: &str) -> Result<Vec<u8>> {
        Client::get(self, ctx, path).await
    }

    async fn post(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>> {
        Client::post(self, ctx, path, data).await
    }

    async fn put(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &serde_json::Value,
    ) -> Result<Vec<u8>> {
        Client::put(self, ctx, path, data).await
    }

    async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<()> {
        Client::delete(self, ctx, path).await
    }
}
