//! Fixed-Window Rate Gate
//!
//! Per-identifier request gate in front of the whole service. A window
//! admits at most `limit` requests; the first request of a window creates
//! the counter and arms its expiry in one atomic store operation. The gate
//! makes a hard admit/reject decision, no queuing and no backpressure;
//! callers treat `false` as terminal for that call.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::store::{CounterStore, MemoryCounterStore};
use crate::constants::rate;

#[derive(Clone)]
pub struct RateGate {
    store: Arc<dyn CounterStore>,
    limit: u32,
    window: Duration,
}

impl RateGate {
    pub fn new(store: Arc<dyn CounterStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    /// In-process gate with the default limit and window.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCounterStore::new()),
            rate::DEFAULT_MAX_REQUESTS,
            Duration::from_secs(rate::DEFAULT_WINDOW_SECS),
        )
    }

    /// Admit or reject one request for (identifier, endpoint) under the
    /// gate's configured limit.
    pub async fn admit(&self, identifier: &str, endpoint: &str) -> bool {
        self.admit_with(identifier, endpoint, self.limit, self.window)
            .await
    }

    /// Admit or reject with an explicit limit and window, for endpoints
    /// with their own budget.
    pub async fn admit_with(
        &self,
        identifier: &str,
        endpoint: &str,
        limit: u32,
        window: Duration,
    ) -> bool {
        let key = format!("rate:{}:{}", identifier, endpoint);
        let count = self.store.increment_with_ttl(&key, window).await;
        let admitted = count <= u64::from(limit);

        if !admitted {
            debug!(%identifier, %endpoint, count, limit, "Rate gate rejected request");
        }
        admitted
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(limit: u32, window_secs: u64) -> RateGate {
        RateGate::new(
            Arc::new(MemoryCounterStore::new()),
            limit,
            Duration::from_secs(window_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_exactly_limit_per_window() {
        let gate = gate(3, 60);

        for _ in 0..3 {
            assert!(gate.admit("1.2.3.4", "/api/email/generate").await);
        }
        assert!(!gate.admit("1.2.3.4", "/api/email/generate").await);
        assert!(!gate.admit("1.2.3.4", "/api/email/generate").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identifiers_and_endpoints_are_independent() {
        let gate = gate(1, 60);

        assert!(gate.admit("1.2.3.4", "/generate").await);
        assert!(!gate.admit("1.2.3.4", "/generate").await);
        // Different identifier, same endpoint.
        assert!(gate.admit("5.6.7.8", "/generate").await);
        // Same identifier, different endpoint.
        assert!(gate.admit("1.2.3.4", "/intent").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_window_counts_from_zero() {
        let gate = gate(2, 60);

        assert!(gate.admit("a", "/x").await);
        assert!(gate.admit("a", "/x").await);
        assert!(!gate.admit("a", "/x").await);

        tokio::time::advance(Duration::from_secs(61)).await;

        // One instant after expiry the full budget is back.
        assert!(gate.admit("a", "/x").await);
        assert!(gate.admit("a", "/x").await);
        assert!(!gate.admit("a", "/x").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_endpoint_override() {
        let gate = gate(10, 60);

        assert!(gate.admit_with("a", "/slow", 1, Duration::from_secs(60)).await);
        assert!(!gate.admit_with("a", "/slow", 1, Duration::from_secs(60)).await);
    }
}
