//! Controller adapters
//!
//! Supports: SD-WAN, ISE, NDO, Catalyst Center, FMC, Meraki
//!
//! # Overview
//!
//! Each controller family gets one [`ControllerAdapter`] implementation that
//! owns its authenticated [`HttpClient`]. [`make_adapter`] selects the
//! implementation for a [`Solution`].

mod adapter;
mod catalystcenter;
mod fmc;
mod ise;
mod meraki;
mod ndo;
mod sdwan;

pub use adapter::ControllerAdapter;
pub use catalystcenter::{credential_field, CatalystCenterAdapter, CREDENTIAL_FIELDS};
pub use fmc::FmcAdapter;
pub use ise::IseAdapter;
pub use meraki::{MerakiAdapter, ORGANIZATION_ENDPOINT_NAME};
pub use ndo::NdoAdapter;
pub use sdwan::SdwanAdapter;

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::http::{HttpClientConfig, HttpClientConfigBuilder};
use crate::types::Solution;
use std::time::Duration;
use tracing::info;

/// Build the adapter for the configured solution
pub fn make_adapter(config: &CollectorConfig) -> Result<Box<dyn ControllerAdapter>> {
    config.validate()?;
    info!(solution = %config.solution, base_url = %config.base_url(), "Creating controller adapter");

    Ok(match config.solution {
        Solution::Sdwan => Box::new(SdwanAdapter::new(config)?),
        Solution::Ise => Box::new(IseAdapter::new(config)?),
        Solution::Ndo => Box::new(NdoAdapter::new(config)?),
        Solution::Catalystcenter => Box::new(CatalystCenterAdapter::new(config)?),
        Solution::Fmc => Box::new(FmcAdapter::new(config)?),
        Solution::Meraki => Box::new(MerakiAdapter::new(config)?),
    })
}

/// HTTP settings shared by every adapter
pub(crate) fn client_config(config: &CollectorConfig) -> HttpClientConfigBuilder {
    HttpClientConfig::builder()
        .base_url(config.base_url())
        .timeout(Duration::from_secs(config.timeout))
        .max_retries(config.max_retries)
        .retry_after(Duration::from_secs(config.retry_after))
        .backoff(
            config.backoff,
            Duration::from_millis(500),
            Duration::from_secs(config.retry_after.max(1)),
        )
        .ssl_verify(config.ssl_verify)
        .header("Accept", "application/json")
}

/// Append a query parameter, choosing `?` or `&`
pub(crate) fn append_query(url: &str, key: &str, value: impl std::fmt::Display) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{key}={value}")
}

#[cfg(test)]
mod tests;
