//! HTTP client with retry and rate limiting
//!
//! Provides the request layer every controller adapter goes through:
//! - Retries on timeouts and 429, honoring `Retry-After`
//! - One re-authentication per call on 401
//! - Single attempt for every other 4xx and all 5xx
//! - Optional token bucket limiter and admission gate

use super::rate_limit::{AdmissionConfig, AdmissionGate, RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator, Domain};
use crate::error::{Error, Result};
use crate::types::{BackoffType, Method};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Base URL for the login handshake, when it differs from `base_url`
    pub auth_base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Attempts per logical request
    pub max_retries: u32,
    /// Delay after a 429 without a usable `Retry-After` header
    pub retry_after: Duration,
    /// Initial delay for backoff after a timeout
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Admission gate configuration
    pub admission: Option<AdmissionConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    /// Keep cookies set by the server
    pub cookie_store: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_base_url: None,
            timeout: Duration::from_secs(crate::config::TIMEOUT),
            max_retries: crate::config::MAX_RETRIES,
            retry_after: Duration::from_secs(crate::config::RETRY_AFTER),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: None,
            admission: None,
            default_headers: HashMap::new(),
            user_agent: format!("nac-collector/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
            cookie_store: false,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the login base URL
    pub fn auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.auth_base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set attempts per request
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the default 429 delay
    pub fn retry_after(mut self, delay: Duration) -> Self {
        self.config.retry_after = delay;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Route every request through an admission gate
    pub fn admission(mut self, config: AdmissionConfig) -> Self {
        self.config.admission = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Verify (or not) the server certificate
    pub fn ssl_verify(mut self, verify: bool) -> Self {
        self.config.accept_invalid_certs = !verify;
        self
    }

    /// Keep cookies between requests
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.config.cookie_store = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override attempts for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set attempts
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// Decoded JSON response with its headers
#[derive(Debug, Clone)]
pub struct JsonResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Body (`Null` for an empty body)
    pub body: Value,
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
    admission: Option<AdmissionGate>,
    requests: AtomicU64,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(config.cookie_store)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        let admission = config.admission.map(AdmissionGate::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
            admission,
            requests: AtomicU64::new(0),
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut config = config;
        if auth_config.needs_cookie_store() {
            config.cookie_store = true;
        }
        let mut client = Self::with_config(config)?;
        client.set_authenticator(auth_config);
        Ok(client)
    }

    /// Set the authenticator
    pub fn set_authenticator(&mut self, auth_config: AuthConfig) {
        let base = self
            .config
            .auth_base_url
            .clone()
            .or_else(|| self.config.base_url.clone())
            .unwrap_or_default();
        self.authenticator = Some(Authenticator::with_client(
            auth_config,
            base,
            self.client.clone(),
        ));
    }

    /// Get the authenticator, if any
    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.authenticator.as_ref()
    }

    /// Run the login handshake now
    pub async fn authenticate(&self) -> Result<()> {
        match &self.authenticator {
            Some(auth) => auth.login().await,
            None => Ok(()),
        }
    }

    /// Tenant domains from the current session
    pub async fn domains(&self) -> Vec<Domain> {
        match &self.authenticator {
            Some(auth) => auth.domains().await,
            None => Vec::new(),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Requests sent so far, retries included
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestConfig::default())
            .await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a generic request
    #[allow(clippy::too_many_lines)]
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(url);
        let max_attempts = config.max_retries.unwrap_or(self.config.max_retries).max(1);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            // Build request
            let mut req = self
                .client
                .request(method.into(), &full_url)
                .timeout(timeout);

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }
            for (key, value) in &config.headers {
                req = req.header(key.as_str(), value.as_str());
            }
            if !config.query.is_empty() {
                req = req.query(&config.query);
            }
            if let Some(ref body) = config.body {
                req = req.json(body);
            }

            // Apply authentication
            let mut generation = 0;
            if let Some(ref auth) = self.authenticator {
                let (authed, seen) = auth.apply(req).await?;
                req = authed;
                generation = seen;
            }

            // Send request, holding the admission permit until the response arrives
            let outcome = {
                let _admission = match &self.admission {
                    Some(gate) => Some(gate.admit().await),
                    None => None,
                };
                if let Some(ref limiter) = self.rate_limiter {
                    limiter.wait().await;
                }
                self.requests.fetch_add(1, Ordering::Relaxed);
                req.send().await
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        attempt += 1;
                        let delay = retry_after_delay(response.headers(), self.config.retry_after);
                        if attempt >= max_attempts {
                            error!(
                                url = %full_url,
                                attempts = attempt,
                                "Rate limited (429), retries exhausted"
                            );
                            return Err(Error::RateLimited {
                                retry_after_seconds: delay.as_secs(),
                            });
                        }
                        warn!(
                            url = %full_url,
                            attempt,
                            max_attempts,
                            delay_secs = delay.as_secs(),
                            "Rate limited (429), retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        match &self.authenticator {
                            Some(auth) if !reauthenticated => {
                                info!(url = %full_url, "Received 401, re-authenticating");
                                auth.reauthenticate(generation).await?;
                                reauthenticated = true;
                                continue;
                            }
                            _ => {
                                error!(url = %full_url, "Received 401 after re-authentication");
                                return Err(Error::SessionExpired { url: full_url });
                            }
                        }
                    }

                    if status.is_client_error() || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        error!(
                            url = %full_url,
                            status = status.as_u16(),
                            "Request failed"
                        );
                        return Err(Error::http_status(status.as_u16(), truncate_body(&body)));
                    }

                    debug!(method = ?method, url = %full_url, status = status.as_u16(), "Request succeeded");
                    return Ok(response);
                }
                Err(e) if e.is_timeout() => {
                    attempt += 1;
                    #[allow(clippy::cast_possible_truncation)]
                    let timeout_ms = timeout.as_millis() as u64;
                    if attempt >= max_attempts {
                        error!(url = %full_url, attempts = attempt, "Request timed out, retries exhausted");
                        return Err(Error::Timeout { timeout_ms });
                    }
                    let delay = self.calculate_backoff(attempt - 1);
                    warn!(
                        url = %full_url,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Request timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(url = %full_url, error = %e, "Request failed");
                    return Err(Error::Http(e));
                }
            }
        }
    }

    /// Make a request and decode the JSON body
    pub async fn request_json(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<JsonResponse> {
        let max_attempts = config.max_retries.unwrap_or(self.config.max_retries).max(1);
        let timeout = config.timeout.unwrap_or(self.config.timeout);
        let mut attempt = 0;

        // A body that stalls past the timeout is retried like a stalled send
        loop {
            let response = self.request(method, url, config.clone()).await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();

            match response.text().await {
                Ok(text) => {
                    return Ok(JsonResponse {
                        status,
                        headers,
                        body: parse_json(&text)?,
                    });
                }
                Err(e) if e.is_timeout() => {
                    attempt += 1;
                    let timeout_ms = timeout.as_millis() as u64;
                    if attempt >= max_attempts {
                        error!(url = %url, attempts = attempt, "Response body timed out, retries exhausted");
                        return Err(Error::Timeout { timeout_ms });
                    }
                    let delay = self.calculate_backoff(attempt - 1);
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Response body timed out, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(Error::Http(e)),
            }
        }
    }

    /// Make a GET request and decode the JSON body
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        Ok(self
            .request_json(Method::GET, url, RequestConfig::default())
            .await?
            .body)
    }

    /// Make a POST request with a JSON body and decode the JSON response
    pub async fn post_json(&self, url: &str, body: Value) -> Result<Value> {
        Ok(self
            .request_json(Method::POST, url, RequestConfig::default().json(body))
            .await?
            .body)
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("has_admission_gate", &self.admission.is_some())
            .finish_non_exhaustive()
    }
}

/// Delay before retrying a 429: the `Retry-After` seconds if present and
/// numeric, otherwise `default`
pub fn retry_after_delay(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Decode a body as JSON; an empty body decodes to `Null`
fn parse_json(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| Error::decode(format!("invalid JSON body: {e}")))
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
