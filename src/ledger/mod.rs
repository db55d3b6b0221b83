//! # Event Ledger
//!
//! Append-only log of user-context events with a pluggable store.
//!
//! ```text
//! LedgerEvent ──► EventStore::append ──► StoredEvent { seq, .. }
//!                 EventStore::list   ──► oldest-first, `since` / `limit`
//!                 Ledger::export_ndjson ──► one JSON object per line
//! ```
//!
//! Sequence numbers start at 1 and are assigned by the store. Events are
//! owned by the store once appended, so later caller edits never leak in.

pub mod memory;

use std::io::Write;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::model::Value;
use crate::{Error, Result};

pub use memory::MemoryEventStore;

// ============================================================================
// Events
// ============================================================================

/// One observed user-context event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    /// Unix milliseconds.
    pub ts: i64,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
    pub goal_state: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_diff: Option<Value>,
}

impl LedgerEvent {
    pub fn new(ts: i64, url: impl Into<String>, title: impl Into<String>, goal_state: impl Into<Value>) -> Self {
        Self {
            ts,
            url: url.into(),
            title: title.into(),
            selection: None,
            goal_state: goal_state.into(),
            action: None,
            artifact_diff: None,
        }
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = Some(selection.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_artifact_diff(mut self, diff: impl Into<Value>) -> Self {
        self.artifact_diff = Some(diff.into());
        self
    }

    /// Decode and check a raw event.
    ///
    /// `goalState` must be present but may be any value, `null` included.
    /// `selection` and `action` may be absent or `null`.
    pub fn from_json(raw: &Json) -> Result<Self> {
        let obj = raw.as_object().ok_or_else(|| invalid("Event must be an object"))?;

        let ts = obj
            .get("ts")
            .and_then(Json::as_f64)
            .filter(|t| t.is_finite())
            .ok_or_else(|| invalid("Event.ts must be a finite number (ms since epoch)"))?;

        let (Some(Json::String(url)), Some(Json::String(title))) = (obj.get("url"), obj.get("title")) else {
            return Err(invalid("Event.url and Event.title must be strings"));
        };

        let goal_state = obj
            .get("goalState")
            .cloned()
            .ok_or_else(|| invalid("Event.goalState is required"))?;

        let selection = optional_string(obj.get("selection"), "Event.selection must be a string if present")?;
        let action = optional_string(obj.get("action"), "Event.action must be a string if present")?;

        Ok(Self {
            ts: ts as i64,
            url: url.clone(),
            title: title.clone(),
            selection,
            goal_state: goal_state.into(),
            action,
            artifact_diff: obj.get("artifactDiff").filter(|d| !d.is_null()).cloned().map(Value::from),
        })
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidEvent(message.to_owned())
}

fn optional_string(field: Option<&Json>, message: &str) -> Result<Option<String>> {
    match field {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(message)),
    }
}

/// An event as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: LedgerEvent,
}

/// Filters for [`EventStore::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Maximum number of events, oldest first. `None` or `0` means all.
    pub limit: Option<usize>,
    /// Inclusive lower bound on `ts`.
    pub since: Option<i64>,
}

impl ListOptions {
    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit), since: None }
    }

    pub fn since(ts: i64) -> Self {
        Self { limit: None, since: Some(ts) }
    }

    pub(crate) fn admits(&self, event: &StoredEvent) -> bool {
        self.since.is_none_or(|since| event.event.ts >= since)
    }

    pub(crate) fn cap(&self) -> usize {
        match self.limit {
            Some(n) if n > 0 => n,
            _ => usize::MAX,
        }
    }
}

// ============================================================================
// Store contract
// ============================================================================

/// Storage contract for the ledger.
///
/// Implementations assign `seq` monotonically from 1 and return events in
/// ascending `seq` order.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Store an event and return it with its sequence number.
    async fn append(&self, event: LedgerEvent) -> Result<StoredEvent>;

    /// Events in ascending `seq` order, filtered by `opts`.
    async fn list(&self, opts: ListOptions) -> Result<Vec<StoredEvent>>;

    /// Drop every event and restart numbering at 1.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// Ledger facade
// ============================================================================

/// Thin facade over an [`EventStore`].
pub struct Ledger<S: EventStore = MemoryEventStore> {
    store: S,
}

impl Ledger<MemoryEventStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryEventStore::new())
    }
}

impl<S: EventStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn append(&self, event: LedgerEvent) -> Result<StoredEvent> {
        self.store.append(event).await
    }

    /// Validate a raw event and append it.
    pub async fn append_json(&self, raw: &Json) -> Result<StoredEvent> {
        let event = LedgerEvent::from_json(raw)?;
        self.store.append(event).await
    }

    pub async fn list(&self, opts: ListOptions) -> Result<Vec<StoredEvent>> {
        self.store.list(opts).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Write every event as NDJSON. Returns the number of lines written.
    pub async fn export_ndjson(&self, out: &mut (dyn Write + Send)) -> Result<usize> {
        let events = self.store.list(ListOptions::default()).await?;
        for event in &events {
            serde_json::to_writer(&mut *out, event)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        debug!(lines = events.len(), "exported ledger");
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw() -> Json {
        json!({"ts": 1000, "url": "https://a.test", "title": "A", "goalState": {"step": 1}})
    }

    #[test]
    fn test_from_json_accepts_minimal_event() {
        let e = LedgerEvent::from_json(&raw()).unwrap();
        assert_eq!(e.ts, 1000);
        assert_eq!(e.goal_state.as_map().map(|m| m.len()), Some(1));
        assert!(e.selection.is_none());
    }

    #[test]
    fn test_from_json_null_goal_state_is_present() {
        let mut r = raw();
        r["goalState"] = Json::Null;
        r["action"] = Json::Null;
        let e = LedgerEvent::from_json(&r).unwrap();
        assert_eq!(e.goal_state, Value::Null);
        assert!(e.action.is_none());
    }

    #[test]
    fn test_from_json_rejections() {
        let cases = [
            (json!("nope"), "Event must be an object"),
            (json!({"ts": "x", "url": "u", "title": "t", "goalState": 1}), "Event.ts must be a finite number (ms since epoch)"),
            (json!({"ts": 1, "url": 2, "title": "t", "goalState": 1}), "Event.url and Event.title must be strings"),
            (json!({"ts": 1, "url": "u", "title": "t"}), "Event.goalState is required"),
            (json!({"ts": 1, "url": "u", "title": "t", "goalState": 1, "selection": 3}), "Event.selection must be a string if present"),
            (json!({"ts": 1, "url": "u", "title": "t", "goalState": 1, "action": []}), "Event.action must be a string if present"),
        ];
        for (input, expected) in cases {
            match LedgerEvent::from_json(&input) {
                Err(Error::InvalidEvent(msg)) => assert_eq!(msg, expected),
                other => panic!("Expected InvalidEvent for {input}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stored_event_serializes_flat() {
        let stored = StoredEvent { seq: 3, event: LedgerEvent::new(5, "u", "t", 1).with_action("click") };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json, json!({"seq": 3, "ts": 5, "url": "u", "title": "t", "goalState": 1, "action": "click"}));
    }

    #[test]
    fn test_list_options_cap() {
        assert_eq!(ListOptions::default().cap(), usize::MAX);
        assert_eq!(ListOptions::limit(0).cap(), usize::MAX);
        assert_eq!(ListOptions::limit(2).cap(), 2);
    }
}
