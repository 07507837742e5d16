//! Windowed Counter Store
//!
//! Backing store for the rate gate. The single primitive is an atomic
//! increment-with-TTL: creating the counter and arming its expiry are one
//! operation, so no interleaving of concurrent first requests can produce a
//! window that never expires.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Atomic counter store keyed by `rate:<identifier>:<endpoint>`.
///
/// Implementations must guarantee that increment and expiry-arming are
/// perceived as a single atomic step per key. An external store (e.g. a
/// Redis `INCR` + `EXPIRE NX` script) satisfies this the same way the
/// in-memory implementation does.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter at `key` and return the post-increment count.
    /// If the key is absent or its window has expired, the counter restarts
    /// at one and its expiry is armed `ttl` from now, atomically.
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> u64;
}

#[derive(Debug)]
struct WindowEntry {
    count: u64,
    expires_at: Instant,
}

/// In-process counter store over a sharded concurrent map. The per-key
/// entry lock makes reset-check, increment, and expiry-arming one step.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: DashMap<String, WindowEntry>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> u64 {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| WindowEntry {
                count: 0,
                expires_at: now + ttl,
            });

        // Expired window: restart the count and re-arm, still under the
        // entry lock.
        if entry.expires_at <= now {
            entry.count = 0;
            entry.expires_at = now + ttl;
        }

        entry.count += 1;
        entry.count
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_counts_increment_within_window() {
        let store = MemoryCounterStore::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 1);
        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 2);
        assert_eq!(store.increment_with_ttl("rate:b:ep", ttl).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_restarts_count() {
        let store = MemoryCounterStore::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 1);
        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_armed_by_first_request_only() {
        let store = MemoryCounterStore::new();
        let ttl = Duration::from_secs(60);

        store.increment_with_ttl("rate:a:ep", ttl).await;
        tokio::time::advance(Duration::from_secs(40)).await;
        // A mid-window hit must not push the expiry out.
        store.increment_with_ttl("rate:a:ep", ttl).await;
        tokio::time::advance(Duration::from_secs(21)).await;

        assert_eq!(store.increment_with_ttl("rate:a:ep", ttl).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_lossless() {
        let store = Arc::new(MemoryCounterStore::new());
        let ttl = Duration::from_secs(60);

        let mut handles = Vec::new();
        for _ in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.increment_with_ttl("rate:a:ep", ttl).await
            }));
        }

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();

        // Every worker observed a distinct post-increment value.
        assert_eq!(counts, (1..=100).collect::<Vec<u64>>());
    }
}
