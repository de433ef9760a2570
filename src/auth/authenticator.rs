//! Authenticator implementation
//!
//! Runs the login handshake, caches the resulting session and applies it
//! to requests. Re-authentication after a 401 is serialized: only one
//! handshake runs at a time, and callers that saw an already-replaced
//! session reuse the new one instead of logging in again.

use super::types::{AuthConfig, Credentials, Domain, ProbeEndpoint, Session};
use crate::decode::value_at_path;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

const JSON: &str = "application/json";

/// Authenticator handles the login handshake and applies the session
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Controller base URL (handshake paths are relative to it)
    base_url: String,
    /// Session from the last successful handshake
    session: Arc<RwLock<Option<Session>>>,
    /// Incremented on every new session
    generation: AtomicU64,
    /// Number of handshakes performed
    handshakes: AtomicU64,
    /// Serializes handshakes
    login_lock: Mutex<()>,
    /// HTTP client for handshake requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig, base_url: impl Into<String>) -> Self {
        Self::with_client(config, base_url, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            config,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Arc::new(RwLock::new(None)),
            generation: AtomicU64::new(0),
            handshakes: AtomicU64::new(0),
            login_lock: Mutex::new(()),
            http_client,
        }
    }

    /// Run the handshake now, replacing any existing session
    pub async fn login(&self) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        let session = self.handshake().await?;
        self.store(session).await;
        Ok(())
    }

    /// Apply the session to a request, logging in first if needed.
    ///
    /// Returns the request together with the session generation it was
    /// built with, for use with [`Authenticator::reauthenticate`].
    pub async fn apply(&self, req: RequestBuilder) -> Result<(RequestBuilder, u64)> {
        if matches!(self.config, AuthConfig::None) {
            return Ok((req, self.generation()));
        }

        let (session, generation) = self.current_session().await?;
        let mut req = req;
        for (name, value) in &session.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(creds) = &session.basic {
            req = req.basic_auth(&creds.username, Some(&creds.password));
        }
        if let Some(token) = &session.bearer {
            req = req.bearer_auth(token);
        }
        Ok((req, generation))
    }

    /// Replace the session after a 401 seen on a request built with
    /// `seen_generation`. No-op if another caller already did it.
    pub async fn reauthenticate(&self, seen_generation: u64) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        if self.generation() != seen_generation {
            debug!("Session already renewed by another request");
            return Ok(());
        }

        info!(auth = self.config.kind(), "Session expired, re-authenticating");
        let previous = self.session.read().await.clone();
        let session = match (&self.config, previous) {
            (
                AuthConfig::TokenHeaders { .. },
                Some(Session {
                    access_token: Some(access),
                    refresh_token: Some(refresh),
                    domains,
                    ..
                }),
            ) => match self.refresh_token_headers(&access, &refresh, domains).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, falling back to full login");
                    self.handshake().await?
                }
            },
            _ => self.handshake().await?,
        };
        self.store(session).await;
        Ok(())
    }

    /// Current session generation (0 before the first login)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of handshakes performed so far
    pub fn handshake_count(&self) -> u64 {
        self.handshakes.load(Ordering::SeqCst)
    }

    /// Domains advertised by the current session
    pub async fn domains(&self) -> Vec<Domain> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.domains.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    async fn current_session(&self) -> Result<(Session, u64)> {
        {
            let cached = self.session.read().await;
            if let Some(session) = cached.as_ref() {
                return Ok((session.clone(), self.generation()));
            }
        }

        let _guard = self.login_lock.lock().await;

        // Double-check after acquiring the lock (another task might have logged in)
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok((session.clone(), self.generation()));
        }

        let session = self.handshake().await?;
        self.store(session.clone()).await;
        Ok((session, self.generation()))
    }

    async fn store(&self, session: Session) {
        let mut cached = self.session.write().await;
        *cached = Some(session);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handshake(&self) -> Result<Session> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        debug!(auth = self.config.kind(), base_url = %self.base_url, "Starting login handshake");

        match &self.config {
            AuthConfig::None => Ok(Session::default()),

            AuthConfig::ApiKey { key } => {
                if key.is_empty() {
                    return Err(Error::auth("API key is empty"));
                }
                Ok(Session {
                    bearer: Some(key.clone()),
                    ..Session::default()
                }
                .with_header(ACCEPT.as_str(), JSON))
            }

            AuthConfig::BasicProbe {
                credentials,
                probes,
            } => self.probe_basic(credentials, probes).await,

            AuthConfig::FormSession {
                credentials,
                login_path,
                token_path,
            } => self.form_session(credentials, login_path, token_path).await,

            AuthConfig::JsonLogin { login_path, body } => self.json_login(login_path, body).await,

            AuthConfig::TokenBody {
                credentials,
                token_path,
                token_field,
                header_name,
            } => {
                self.token_body(credentials, token_path, token_field, header_name)
                    .await
            }

            AuthConfig::TokenHeaders {
                credentials,
                token_path,
                ..
            } => self.token_headers(credentials, token_path).await,
        }
    }

    /// Try each probe endpoint with basic credentials; first 200 wins
    async fn probe_basic(
        &self,
        credentials: &Credentials,
        probes: &[ProbeEndpoint],
    ) -> Result<Session> {
        for probe in probes {
            let response = self
                .http_client
                .get(self.url(&probe.path))
                .basic_auth(&credentials.username, Some(&credentials.password))
                .header(ACCEPT, probe.media_type.as_str())
                .header(CONTENT_TYPE, probe.media_type.as_str())
                .send()
                .await;

            match response {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    info!(endpoint = %probe.path, "Authentication successful");
                    return Ok(Session {
                        basic: Some(credentials.clone()),
                        ..Session::default()
                    }
                    .with_header(ACCEPT.as_str(), JSON)
                    .with_header(CONTENT_TYPE.as_str(), JSON));
                }
                Ok(resp) => {
                    warn!(
                        endpoint = %probe.path,
                        status = resp.status().as_u16(),
                        "Authentication endpoint rejected the credentials"
                    );
                }
                Err(e) => {
                    warn!(endpoint = %probe.path, error = %e, "Authentication endpoint unreachable");
                }
            }
        }

        Err(Error::auth(
            "no authentication endpoint accepted the credentials",
        ))
    }

    /// Form login, then exchange the session cookie for an XSRF token
    async fn form_session(
        &self,
        credentials: &Credentials,
        login_path: &str,
        token_path: &str,
    ) -> Result<Session> {
        let form = [
            ("j_username", credentials.username.as_str()),
            ("j_password", credentials.password.as_str()),
        ];
        let response = self
            .http_client
            .post(self.url(login_path))
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            return Err(Error::auth(format!(
                "login returned status {}",
                response.status().as_u16()
            )));
        }

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_cookie)
            .ok_or_else(|| Error::auth("login did not return a JSESSIONID cookie"))?;

        let response = self
            .http_client
            .get(self.url(token_path))
            .header(COOKIE, cookie.as_str())
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            return Err(Error::auth(format!(
                "token request returned status {}",
                response.status().as_u16()
            )));
        }

        let token = response.text().await.map_err(Error::Http)?;
        let token = token.trim();
        if token.is_empty() || token.contains("<html") {
            return Err(Error::auth("invalid credentials, no XSRF token issued"));
        }

        info!("Authentication successful");
        Ok(Session::default()
            .with_header(CONTENT_TYPE.as_str(), JSON)
            .with_header(COOKIE.as_str(), cookie)
            .with_header("X-XSRF-TOKEN", token))
    }

    /// JSON login; the controller's cookie lands in the client cookie store
    async fn json_login(&self, login_path: &str, body: &Value) -> Result<Session> {
        let response = self
            .http_client
            .post(self.url(login_path))
            .json(body)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "login request failed with status {status}: {body}"
            )));
        }

        info!("Authentication successful");
        Ok(Session::default().with_header(CONTENT_TYPE.as_str(), JSON))
    }

    /// Basic-auth POST returning a token in the body
    async fn token_body(
        &self,
        credentials: &Credentials,
        token_path: &str,
        token_field: &str,
        header_name: &str,
    ) -> Result<Session> {
        let response = self
            .http_client
            .post(self.url(token_path))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(CONTENT_TYPE, JSON)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let body: Value = response.json().await.map_err(Error::Http)?;
        let token = extract_jsonpath(&body, token_field).ok_or_else(|| {
            Error::auth(format!("could not extract token from path: {token_field}"))
        })?;

        info!("Authentication successful");
        Ok(Session::default()
            .with_header(CONTENT_TYPE.as_str(), JSON)
            .with_header(header_name, token))
    }

    /// Basic-auth POST returning tokens and domains in response headers
    async fn token_headers(&self, credentials: &Credentials, token_path: &str) -> Result<Session> {
        let response = self
            .http_client
            .post(self.url(token_path))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(CONTENT_TYPE, JSON)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !(status == StatusCode::OK || status == StatusCode::NO_CONTENT) {
            return Err(Error::auth(format!(
                "token generation returned status {}",
                status.as_u16()
            )));
        }

        let session = self.session_from_token_headers(response.headers(), Vec::new())?;
        info!(domains = session.domains.len(), "Authentication successful");
        Ok(session)
    }

    async fn refresh_token_headers(
        &self,
        access: &str,
        refresh: &str,
        domains: Vec<Domain>,
    ) -> Result<Session> {
        let AuthConfig::TokenHeaders {
            refresh_path,
            access_header,
            refresh_header,
            ..
        } = &self.config
        else {
            return Err(Error::token_refresh("refresh not supported for this handshake"));
        };

        let response = self
            .http_client
            .post(self.url(refresh_path))
            .header(access_header.as_str(), access)
            .header(refresh_header.as_str(), refresh)
            .header(CONTENT_TYPE, JSON)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !(status == StatusCode::OK || status == StatusCode::NO_CONTENT) {
            return Err(Error::token_refresh(format!(
                "refresh returned status {}",
                status.as_u16()
            )));
        }

        self.session_from_token_headers(response.headers(), domains)
            .map_err(|e| Error::token_refresh(e.to_string()))
    }

    fn session_from_token_headers(
        &self,
        headers: &reqwest::header::HeaderMap,
        previous_domains: Vec<Domain>,
    ) -> Result<Session> {
        let AuthConfig::TokenHeaders {
            access_header,
            refresh_header,
            domains_header,
            ..
        } = &self.config
        else {
            return Err(Error::auth("token headers expected"));
        };

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let access = header(access_header)
            .ok_or_else(|| Error::auth(format!("response has no {access_header} header")))?;
        let refresh = header(refresh_header);
        let domains = match header(domains_header) {
            Some(raw) => parse_domains(&raw)?,
            None => previous_domains,
        };

        Ok(Session {
            access_token: Some(access.clone()),
            refresh_token: refresh,
            domains,
            ..Session::default()
        }
        .with_header(CONTENT_TYPE.as_str(), JSON)
        .with_header(access_header.as_str(), access))
    }
}

/// Extract `JSESSIONID=...` from a `Set-Cookie` header value
pub fn session_cookie(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    pair.starts_with("JSESSIONID=").then(|| pair.to_string())
}

/// Parse the JSON list of domains advertised at login
pub fn parse_domains(raw: &str) -> Result<Vec<Domain>> {
    serde_json::from_str(raw).map_err(|e| Error::auth(format!("malformed domain list: {e}")))
}

/// Extract a value from JSON using a simple JSONPath expression
/// Supports basic paths like "$.data.token" or "data.token"
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    match value_at_path(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
