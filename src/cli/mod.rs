//! CLI module
//!
//! Command-line interface for collection runs.
//!
//! # Commands
//!
//! - `collect` - Authenticate, walk the endpoint tree and write the JSON document
//! - `endpoints` - Print the resolved endpoint definitions as YAML
//! - `solutions` - List supported controllers

mod commands;
mod runner;

pub use commands::{Cli, Commands, ConnectionArgs, EndpointArgs};
pub use runner::Runner;
