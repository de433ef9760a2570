//! Request pacing
//!
//! Two mechanisms: a governor token bucket for controllers with a published
//! request quota, and an admission gate (one permit plus a fixed delay after
//! acquiring it) that serializes egress while callers fan out concurrently.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

/// Configuration for the admission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Requests allowed in flight
    pub max_in_flight: usize,
    /// Delay after acquiring a permit, before the request leaves
    pub delay: Duration,
}

impl AdmissionConfig {
    /// One request in flight, spaced to stay under `requests_per_second`
    pub fn per_second(requests_per_second: u32) -> Self {
        let rps = u64::from(requests_per_second.max(1));
        Self {
            max_in_flight: 1,
            delay: Duration::from_millis(1000 / rps),
        }
    }
}

/// Shared admission gate: a semaphore plus a fixed post-acquire delay
#[derive(Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    delay: Duration,
}

/// Held while a request is in flight
pub struct Admission {
    _permit: Option<tokio::sync::OwnedSemaphorePermit>,
}

impl AdmissionGate {
    /// Create a gate from config
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            delay: config.delay,
        }
    }

    /// Wait for a permit, then the configured delay. The returned guard
    /// must live until the response has been received.
    pub async fn admit(&self) -> Admission {
        // The semaphore is never closed, so acquisition only fails if it is,
        // in which case requests proceed unpaced.
        let permit = Arc::clone(&self.permits).acquire_owned().await.ok();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Admission { _permit: permit }
    }

    /// Permits currently available
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("delay", &self.delay)
            .field("available", &self.available())
            .finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_rate_limiter_config_new() {
        let config = RateLimiterConfig::new(50, 25);
        assert_eq!(config.requests_per_second, 50);
        assert_eq!(config.burst_size, 25);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_burst() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(10, 5));

        let burst = async {
            for _ in 0..5 {
                limiter.wait().await;
            }
        };
        assert!(tokio::time::timeout(Duration::from_millis(50), burst)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_rate_limiter_zero_is_clamped() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
        limiter.wait().await;
    }

    #[test]
    fn test_admission_config_per_second() {
        let config = AdmissionConfig::per_second(10);
        assert_eq!(config.max_in_flight, 1);
        assert_eq!(config.delay, Duration::from_millis(100));

        assert_eq!(AdmissionConfig::per_second(0).delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_admission_gate_holds_permit() {
        let gate = AdmissionGate::new(AdmissionConfig {
            max_in_flight: 1,
            delay: Duration::ZERO,
        });

        let guard = gate.admit().await;
        assert_eq!(gate.available(), 0);
        drop(guard);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_admission_gate_serializes_concurrent_callers() {
        let gate = AdmissionGate::new(AdmissionConfig {
            max_in_flight: 1,
            delay: Duration::from_millis(50),
        });

        let start = Instant::now();
        let tasks = (0..3).map(|_| {
            let gate = gate.clone();
            async move {
                let _admission = gate.admit().await;
            }
        });
        futures::future::join_all(tasks).await;

        // Three admissions, each paying the delay while holding the only permit
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
