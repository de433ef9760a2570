// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # NAC Collector
//!
//! Collects the configuration of Cisco network controllers (Catalyst SD-WAN,
//! ISE, NDO, Catalyst Center, FMC, Meraki) into one nested JSON document for
//! Infrastructure-as-Code tooling.
//!
//! ## Features
//!
//! - **Declarative endpoints**: YAML endpoint trees, packaged per controller,
//!   with overrides to move or add endpoints
//! - **Per-controller adapters**: login handshakes, payload envelopes,
//!   pagination and identifier rules behind one trait
//! - **Resilient HTTP**: bounded retry on 429 and timeouts, silent
//!   re-authentication on 401
//! - **Parent/child traversal**: children fetched once per parent item, in
//!   order or concurrently behind an admission gate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nac_collector::{make_adapter, resolve_endpoints, CollectorConfig, Result, Solution};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = CollectorConfig::new(
//!         Solution::Catalystcenter,
//!         "https://dnac.example.com",
//!         "admin",
//!         "secret",
//!     );
//!     let defs = resolve_endpoints(config.solution, None)?;
//!
//!     let adapter = make_adapter(&config)?;
//!     adapter.authenticate().await?;
//!     let tree = adapter.collect(&defs).await;
//!
//!     println!("{}", tree.to_json_pretty()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Endpoint definitions (loader, overrides, packaged endpoints)   │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┴─────────────────────────────────┐
//! │  Traversal engine → ResultTree                                  │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │  ControllerAdapter
//! ┌──────────┬───────────┬────────┴──────┬────────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Partition  │   Decode    │
//! ├──────────┼───────────┼───────────────┼────────────┼─────────────┤
//! │ API Key  │ GET/POST  │ Link Header   │ Id lookup  │ Envelopes   │
//! │ Basic    │ Retry     │ Next URL      │ Conditions │ Key merge   │
//! │ Session  │ Rate Limit│               │ Domains    │             │
//! │ Tokens   │ Admission │               │            │             │
//! └──────────┴───────────┴───────────────┴────────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the collector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration
pub mod config;

/// Controller login handshakes
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response envelopes
pub mod decode;

/// Identifier lookup, parent conditions and domain expansion
pub mod partition;

/// YAML loader for endpoint definitions
pub mod loader;

/// Packaged endpoint definitions
pub mod endpoints;

/// Traversal engine and result tree
pub mod engine;

/// Controller adapters
pub mod controllers;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, CollectorConfig};
pub use controllers::{make_adapter, ControllerAdapter};
pub use engine::{CollectedItem, ResultEntry, ResultTree};
pub use loader::{
    apply_overrides, load_endpoints, load_endpoints_from_str, resolve_endpoints,
    EndpointDefinition,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
