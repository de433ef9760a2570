//! Collector configuration
//!
//! `CollectorConfig` carries everything a collection run needs besides the
//! endpoint definitions: target solution, credentials, base URL and the
//! HTTP retry tuning. It can be built from the command line or loaded from
//! a YAML/JSON document.

use crate::error::{Error, Result};
use crate::types::{BackoffType, OptionStringExt, Solution};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Constants
// ============================================================================

/// Default number of attempts for a single logical request
pub const MAX_RETRIES: u32 = 5;

/// Default delay in seconds after a 429 without `Retry-After`
pub const RETRY_AFTER: u64 = 60;

/// Default request timeout in seconds
pub const TIMEOUT: u64 = 30;

/// Page size requested from ISE ERS endpoints
pub const ISE_ERS_PAGE_SIZE: u32 = 100;

/// Page size requested from FMC collections
pub const FMC_PAGE_LIMIT: u32 = 1000;

/// FMC accepts 120 requests per minute per user
pub const FMC_REQUESTS_PER_SECOND: u32 = 2;

/// Meraki dashboard ceiling per organization
pub const MERAKI_REQUESTS_PER_SECOND: u32 = 10;

/// Environment variable holding the Meraki organization filter
pub const MERAKI_ORG_IDS_ENV: &str = "NAC_MERAKI_ORG_IDS";

/// Meraki dashboard API base URL
pub const MERAKI_BASE_URL: &str = "https://api.meraki.com/api/v1";

// ============================================================================
// Collector Config
// ============================================================================

/// Complete configuration for one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Target controller family
    pub solution: Solution,

    /// Controller base URL (e.g. `https://vmanage.example.com`)
    pub base_url: String,

    /// Login user name (unused by Meraki)
    #[serde(default)]
    pub username: String,

    /// Password, or the API key for Meraki
    #[serde(default)]
    pub password: String,

    /// Verify the controller's TLS certificate
    #[serde(default)]
    pub ssl_verify: bool,

    /// Attempts per logical request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds to wait after a 429 without `Retry-After`
    #[serde(default = "default_retry_after")]
    pub retry_after: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Backoff applied between timed-out attempts
    #[serde(default)]
    pub backoff: BackoffType,

    /// ISE ERS page size
    #[serde(default = "default_ise_page_size")]
    pub ise_page_size: u32,

    /// FMC collection page size
    #[serde(default = "default_fmc_page_limit")]
    pub fmc_page_limit: u32,

    /// Meraki requests-per-second ceiling
    #[serde(default = "default_meraki_rps")]
    pub meraki_requests_per_second: u32,

    /// Restrict Meraki collection to these organization ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meraki_org_ids: Option<Vec<String>>,
}

fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_retry_after() -> u64 {
    RETRY_AFTER
}

fn default_timeout() -> u64 {
    TIMEOUT
}

fn default_ise_page_size() -> u32 {
    ISE_ERS_PAGE_SIZE
}

fn default_fmc_page_limit() -> u32 {
    FMC_PAGE_LIMIT
}

fn default_meraki_rps() -> u32 {
    MERAKI_REQUESTS_PER_SECOND
}

impl CollectorConfig {
    /// Create a config with default tuning
    pub fn new(
        solution: Solution,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            solution,
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            ssl_verify: false,
            max_retries: MAX_RETRIES,
            retry_after: RETRY_AFTER,
            timeout: TIMEOUT,
            backoff: BackoffType::default(),
            ise_page_size: ISE_ERS_PAGE_SIZE,
            fmc_page_limit: FMC_PAGE_LIMIT,
            meraki_requests_per_second: MERAKI_REQUESTS_PER_SECOND,
            meraki_org_ids: None,
        }
    }

    /// Set the attempt budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the default 429 delay
    #[must_use]
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = seconds;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Enable or disable TLS verification
    #[must_use]
    pub fn with_ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Set the Meraki rate ceiling
    #[must_use]
    pub fn with_meraki_requests_per_second(mut self, rps: u32) -> Self {
        self.meraki_requests_per_second = rps;
        self
    }

    /// Restrict Meraki collection to the given organizations
    #[must_use]
    pub fn with_meraki_org_ids(mut self, ids: Option<Vec<String>>) -> Self {
        self.meraki_org_ids = ids;
        self
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the fields every run depends on
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(self.base_url())?;

        if self.max_retries == 0 {
            return Err(Error::invalid_value("max_retries", "must be at least 1"));
        }
        if self.timeout == 0 {
            return Err(Error::invalid_value("timeout", "must be at least 1 second"));
        }

        match self.solution {
            Solution::Meraki => {
                if self.password.is_empty() {
                    return Err(Error::missing_field("password (Meraki API key)"));
                }
                if self.meraki_requests_per_second == 0 {
                    return Err(Error::invalid_value(
                        "meraki_requests_per_second",
                        "must be at least 1",
                    ));
                }
            }
            _ => {
                if self.username.is_empty() {
                    return Err(Error::missing_field("username"));
                }
            }
        }
        Ok(())
    }
}

/// Parse a comma separated organization filter, ignoring blanks
pub fn parse_org_ids(raw: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = raw
        .split(',')
        .filter_map(|id| id.trim().to_string().none_if_empty())
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Load a config from a YAML or JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<CollectorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load a config from a YAML (or JSON) string
pub fn load_config_from_str(content: &str) -> Result<CollectorConfig> {
    let config: CollectorConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
