//! HTTP client module
//!
//! Provides the request layer shared by all controller adapters.
//!
//! # Features
//!
//! - **Retries**: timeouts and 429 are retried up to the attempt budget
//! - **Retry-After**: honored on 429, with a configured fallback delay
//! - **Re-authentication**: one handshake per call on 401
//! - **Pacing**: governor token bucket and a semaphore admission gate

mod client;
mod rate_limit;

pub use client::{
    retry_after_delay, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
    JsonResponse, RequestConfig,
};
pub use rate_limit::{Admission, AdmissionConfig, AdmissionGate, RateLimiter, RateLimiterConfig};
