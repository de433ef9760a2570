//! CLI commands and argument parsing

use crate::config::{parse_org_ids, CollectorConfig, MERAKI_BASE_URL};
use crate::error::{Error, Result};
use crate::types::{LogLevel, Solution};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Collects configuration from Cisco network controllers
#[derive(Parser, Debug)]
#[command(name = "nac-collector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(short, long, global = true, value_enum, default_value = "WARNING")]
    pub verbosity: LogLevel,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the configuration of one controller into a JSON file
    Collect {
        /// Controller connection
        #[command(flatten)]
        connection: ConnectionArgs,

        /// Endpoint sources
        #[command(flatten)]
        endpoints: EndpointArgs,

        /// Output file (default: <solution>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the endpoint definitions a collection would use
    Endpoints {
        /// Controller family
        #[arg(short, long, value_enum)]
        solution: Solution,

        /// Endpoint sources
        #[command(flatten)]
        endpoints: EndpointArgs,
    },

    /// List supported solutions
    Solutions,
}

/// Controller connection settings
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Controller family
    #[arg(short, long, value_enum)]
    pub solution: Solution,

    /// Username
    #[arg(short, long, env = "NAC_USERNAME", default_value = "")]
    pub username: String,

    /// Password, or the API key for Meraki
    #[arg(short, long, env = "NAC_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Base URL of the controller
    #[arg(long, env = "NAC_URL")]
    pub url: Option<String>,

    /// Verify TLS certificates
    #[arg(long)]
    pub ssl_verify: bool,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = crate::config::TIMEOUT)]
    pub timeout: u64,

    /// Attempts per request
    #[arg(long, default_value_t = crate::config::MAX_RETRIES)]
    pub max_retries: u32,

    /// Seconds to wait after a 429 without Retry-After
    #[arg(long, default_value_t = crate::config::RETRY_AFTER)]
    pub retry_after: u64,

    /// Meraki requests per second
    #[arg(long, default_value_t = crate::config::MERAKI_REQUESTS_PER_SECOND)]
    pub meraki_requests_per_second: u32,

    /// Meraki organizations to collect (comma separated)
    #[arg(long, env = "NAC_MERAKI_ORG_IDS")]
    pub meraki_org_ids: Option<String>,
}

impl ConnectionArgs {
    /// Build the run configuration
    pub fn to_config(&self) -> Result<CollectorConfig> {
        let url = match (&self.url, self.solution) {
            (Some(url), _) => url.clone(),
            (None, Solution::Meraki) => MERAKI_BASE_URL.to_string(),
            (None, _) => return Err(Error::missing_field("url (--url or NAC_URL)")),
        };

        let config = CollectorConfig::new(self.solution, url, &self.username, &self.password)
            .with_ssl_verify(self.ssl_verify)
            .with_timeout(self.timeout)
            .with_max_retries(self.max_retries)
            .with_retry_after(self.retry_after)
            .with_meraki_requests_per_second(self.meraki_requests_per_second)
            .with_meraki_org_ids(self.meraki_org_ids.as_deref().and_then(parse_org_ids));
        config.validate()?;
        Ok(config)
    }
}

/// Where endpoint definitions come from
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Endpoint definition file (default: packaged definitions)
    #[arg(short, long)]
    pub endpoints_file: Option<PathBuf>,

    /// Overrides moving or adding endpoints
    #[arg(long)]
    pub overrides_file: Option<PathBuf>,
}
