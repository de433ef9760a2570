//! Auth configuration types
//!
//! Each controller family authenticates differently. `AuthConfig` names the
//! handshake and carries what it needs; `Session` is what a successful
//! handshake leaves behind for every subsequent request.

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// User name and password (or API key) supplied by the caller
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Login user name
    pub username: String,
    /// Password, or API key for key-only controllers
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Endpoint probed with basic credentials during login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEndpoint {
    /// Path relative to the base URL
    pub path: String,
    /// Value sent as `Accept` and `Content-Type`
    pub media_type: String,
}

impl ProbeEndpoint {
    /// Create a probe endpoint
    pub fn new(path: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }
}

/// Authentication handshake
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// API key presented as a bearer token on every call
    ApiKey {
        /// The key
        key: String,
    },

    /// Basic credentials probed against endpoints in order; the first
    /// 200 establishes the session (ISE)
    BasicProbe {
        /// Credentials
        credentials: Credentials,
        /// Probe endpoints in order
        probes: Vec<ProbeEndpoint>,
    },

    /// Form login yielding a session cookie, exchanged for an XSRF token (SD-WAN)
    FormSession {
        /// Credentials
        credentials: Credentials,
        /// Form login path
        login_path: String,
        /// Token exchange path
        token_path: String,
    },

    /// JSON login whose session cookie is kept in the client cookie store (NDO)
    JsonLogin {
        /// Login path
        login_path: String,
        /// Login body
        body: JsonValue,
    },

    /// Basic-auth POST returning a token in the JSON body (Catalyst Center)
    TokenBody {
        /// Credentials
        credentials: Credentials,
        /// Token path
        token_path: String,
        /// Dot path of the token in the response body
        token_field: String,
        /// Header carrying the token on later requests
        header_name: String,
    },

    /// Basic-auth POST returning access/refresh tokens and tenant domains in
    /// response headers (FMC)
    TokenHeaders {
        /// Credentials
        credentials: Credentials,
        /// Token generation path
        token_path: String,
        /// Token refresh path
        refresh_path: String,
        /// Header with the access token
        access_header: String,
        /// Header with the refresh token
        refresh_header: String,
        /// Header with the JSON list of domains
        domains_header: String,
    },
}

impl AuthConfig {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::ApiKey { .. } => "api_key",
            AuthConfig::BasicProbe { .. } => "basic_probe",
            AuthConfig::FormSession { .. } => "form_session",
            AuthConfig::JsonLogin { .. } => "json_login",
            AuthConfig::TokenBody { .. } => "token_body",
            AuthConfig::TokenHeaders { .. } => "token_headers",
        }
    }

    /// The handshake relies on cookies set by the controller
    pub fn needs_cookie_store(&self) -> bool {
        matches!(self, AuthConfig::JsonLogin { .. })
    }
}

/// Tenant domain advertised at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Domain UUID
    pub uuid: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// State left behind by a successful handshake
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Headers added to every request
    pub headers: Vec<(String, String)>,
    /// Basic credentials added to every request
    pub basic: Option<Credentials>,
    /// Bearer token added to every request
    pub bearer: Option<String>,
    /// Access token (FMC)
    pub access_token: Option<String>,
    /// Refresh token (FMC)
    pub refresh_token: Option<String>,
    /// Tenant domains (FMC)
    pub domains: Vec<Domain>,
}

impl Session {
    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of a session header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
