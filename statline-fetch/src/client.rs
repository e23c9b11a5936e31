//! REST fetch client.
//!
//! [`FetchClient`] performs exactly one request/response cycle per call and
//! maps every failure into [`PipelineError`]. It does not retry and does not
//! cache; see [`crate::retry`] for the loops that wrap it.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, HttpErrorKind, PipelineError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string for Statline.
const USER_AGENT: &str = concat!("statline/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request Options
// ============================================================================

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Extra headers for this request only.
    pub headers: Vec<(String, String)>,
    /// Overrides the client timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the timeout for this request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Fetch Client
// ============================================================================

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: Client,
    base_url: Url,
    timeout: Duration,
}

impl FetchClient {
    /// Starts building a client for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> FetchClientBuilder {
        FetchClientBuilder::new(base_url)
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the default timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves an endpoint against the base URL.
    ///
    /// Absolute URLs pass through; relative endpoints are appended to the
    /// base path, so `teams` on `https://host/v1` becomes `https://host/v1/teams`.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Performs a request and validates the JSON body as `T`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Timeout`] when the request times out.
    /// - [`PipelineError::Network`] on connection-level failure.
    /// - [`PipelineError::RateLimit`] on HTTP 429.
    /// - [`PipelineError::Http`] on any other non-2xx status, or a 2xx
    ///   body that is not JSON.
    /// - [`PipelineError::Parse`] when the JSON does not match `T`.
    #[instrument(skip(self, method, body, options), fields(method = %method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<T, PipelineError> {
        let (url, status, text) = self.send(method.clone(), endpoint, body, options).await?;

        let value: Value = serde_json::from_str(&text).map_err(|e| PipelineError::Http {
            url: url.clone(),
            method: method.to_string(),
            status_code: status.as_u16(),
            kind: HttpErrorKind::MalformedBody {
                cause: e.to_string(),
            },
        })?;

        serde_json::from_value(value).map_err(|e| PipelineError::Parse {
            url,
            cause: e.to_string(),
        })
    }

    /// Performs a GET request and validates the JSON body as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<T, PipelineError> {
        self.request(Method::GET, endpoint, None, options).await
    }

    /// Performs a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        options: &RequestOptions,
    ) -> Result<T, PipelineError> {
        self.request(Method::POST, endpoint, Some(body), options)
            .await
    }

    /// Performs a GET request and returns the raw body.
    ///
    /// Error mapping matches [`request`](Self::request) minus JSON handling.
    #[instrument(skip(self, options))]
    pub async fn get_text(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<String, PipelineError> {
        let (_, _, text) = self.send(Method::GET, endpoint, None, options).await?;
        Ok(text)
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<(String, StatusCode, String), PipelineError> {
        let url = self.url_for(endpoint);
        let timeout = options.timeout.unwrap_or(self.timeout);

        let mut request = self
            .inner
            .request(method.clone(), &url)
            .timeout(timeout);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(url = %url, "Sending request");
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&url, timeout, &e))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Response received");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimit {
                retry_after_ms: retry_after_ms(&response),
                url,
            });
        }
        if !status.is_success() {
            return Err(PipelineError::Http {
                url,
                method: method.to_string(),
                status_code: status.as_u16(),
                kind: HttpErrorKind::Status,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&url, timeout, &e))?;
        Ok((url, status, text))
    }
}

/// Maps a reqwest failure to a timeout or network error.
fn transport_error(url: &str, timeout: Duration, error: &reqwest::Error) -> PipelineError {
    if error.is_timeout() {
        return PipelineError::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    PipelineError::Network {
        url: url.to_string(),
        cause: error_chain(error),
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn retry_after_ms(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after)
}

/// Parses a `Retry-After` value given in seconds into milliseconds.
///
/// HTTP-date values are not supported and yield `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_retry_after(value: &str) -> Option<u64> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds * 1000.0).round() as u64)
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`FetchClient`].
#[derive(Debug, Clone)]
pub struct FetchClientBuilder {
    base_url: String,
    bearer_token: Option<String>,
    headers: Vec<(String, String)>,
    timeout: Duration,
}

impl FetchClientBuilder {
    /// Creates a builder with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Adds a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds several default headers.
    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or a header is invalid, or the
    /// TLS backend cannot be initialized.
    pub fn build(self) -> Result<FetchClient, ClientError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: self.base_url.clone(),
            cause: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::InvalidHeader(AUTHORIZATION.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let inner = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(FetchClient {
            inner,
            base_url,
            timeout: self.timeout,
        })
    }
}
