//! Common types used throughout the collector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// Solution
// ============================================================================

/// Controller family a collection run targets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPERCASE")]
pub enum Solution {
    /// Catalyst SD-WAN Manager
    Sdwan,
    /// Identity Services Engine
    Ise,
    /// Nexus Dashboard Orchestrator
    Ndo,
    /// Catalyst Center (DNA Center)
    Catalystcenter,
    /// Secure Firewall Management Center
    Fmc,
    /// Meraki Dashboard
    Meraki,
}

impl Solution {
    /// All supported solutions
    pub const ALL: [Solution; 6] = [
        Solution::Sdwan,
        Solution::Ise,
        Solution::Ndo,
        Solution::Catalystcenter,
        Solution::Fmc,
        Solution::Meraki,
    ];

    /// Canonical upper-case name
    pub fn as_str(self) -> &'static str {
        match self {
            Solution::Sdwan => "SDWAN",
            Solution::Ise => "ISE",
            Solution::Ndo => "NDO",
            Solution::Catalystcenter => "CATALYSTCENTER",
            Solution::Fmc => "FMC",
            Solution::Meraki => "MERAKI",
        }
    }

    /// Lower-case name used for default file names
    pub fn file_stem(self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Solution {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Solution::ALL
            .into_iter()
            .find(|solution| solution.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::invalid_value("solution", format!("unknown solution '{s}'")))
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff between timed-out attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level selectable from the command line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Critical,
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Critical | LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
