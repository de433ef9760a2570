//! Authentication module
//!
//! Supports the controller handshakes: API key, basic-auth probing, form
//! session with XSRF token, JSON login with cookies, token-in-body and
//! token-in-headers with tenant domains.
//!
//! The `Authenticator` runs the handshake lazily, caches the `Session`, and
//! serializes re-authentication after a session expires.

mod authenticator;
mod types;

pub use authenticator::{extract_jsonpath, parse_domains, session_cookie, Authenticator};
pub use types::{AuthConfig, Credentials, Domain, ProbeEndpoint, Session};
