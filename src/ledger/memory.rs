//! In-memory event store.
//!
//! Sequence counter and event list live under one lock so `seq` order and
//! list order always agree.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{EventStore, LedgerEvent, ListOptions, StoredEvent};
use crate::Result;

/// Ledger store backed by a `Vec`. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    last_seq: u64,
    events: Vec<StoredEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: LedgerEvent) -> Result<StoredEvent> {
        let mut inner = self.inner.write();
        inner.last_seq += 1;
        let stored = StoredEvent { seq: inner.last_seq, event };
        inner.events.push(stored.clone());
        debug!(seq = stored.seq, ts = stored.event.ts, "appended ledger event");
        Ok(stored)
    }

    async fn list(&self, opts: ListOptions) -> Result<Vec<StoredEvent>> {
        let inner = self.inner.read();
        Ok(inner
            .events
            .iter()
            .filter(|e| opts.admits(e))
            .take(opts.cap())
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.last_seq = 0;
        inner.events.clear();
        Ok(())
    }
}
