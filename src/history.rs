//! History Sink
//!
//! Narrow interface for recording completed generations. The sink is a
//! fire-and-forget collaborator: the service logs and swallows its
//! failures, never propagating them to the generation caller. Tests
//! substitute `MemoryHistory`; deployments plug in a persistence-backed
//! implementation.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::types::{HistoryEntry, MailError, Result};

#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record(&self, entry: HistoryEntry) -> Result<()>;
}

/// Discards every entry. The default when no persistence layer is wired.
#[derive(Debug, Default)]
pub struct NoopHistory;

#[async_trait]
impl HistorySink for NoopHistory {
    async fn record(&self, _entry: HistoryEntry) -> Result<()> {
        Ok(())
    }
}

/// Records entries in memory, for tests and local inspection.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistorySink for MemoryHistory {
    async fn record(&self, entry: HistoryEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| MailError::History("history lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
