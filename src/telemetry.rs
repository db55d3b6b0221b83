//! Telemetry ring buffer.
//!
//! Fixed capacity, overwrite-oldest. The buffer is an owned value handed to
//! whoever records events; there is no process-wide instance.

use std::collections::VecDeque;
use std::sync::LazyLock;

use chrono::Utc;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::trace;

use crate::model::{PropertyMap, Value};
use crate::{Error, Result};

/// Default number of retained events.
pub const DEFAULT_CAPACITY: usize = 200;

/// Longest string property kept, in characters.
pub const MAX_PROP_CHARS: usize = 256;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_:. -]{1,64}$").expect("valid regex"));

static SENSITIVE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)email|e-mail|phone|tel|name|user|password|token|auth").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Unix milliseconds at record time.
    pub ts: i64,
    pub name: String,
    pub props: PropertyMap,
}

pub struct TelemetryBuffer {
    capacity: usize,
    events: Mutex<VecDeque<TelemetryEvent>>,
}

impl TelemetryBuffer {
    /// A buffer holding at most `capacity` events. Zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, events: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate the name, sanitize `props` and store the event.
    pub fn record(&self, name: &str, props: Option<&Json>) -> Result<TelemetryEvent> {
        if !NAME_RE.is_match(name) {
            return Err(Error::InvalidEvent("invalid_name".into()));
        }
        let event = TelemetryEvent {
            ts: Utc::now().timestamp_millis(),
            name: name.to_owned(),
            props: sanitize_props(props),
        };
        self.push(event.clone());
        trace!(event = name, "recorded telemetry event");
        Ok(event)
    }

    /// Store an already-built event, evicting the oldest when full.
    pub fn push(&self, event: TelemetryEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// The newest `n` events, oldest first.
    pub fn last(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = self.events.lock();
        let skip = events.len().saturating_sub(n);
        events.iter().skip(skip).cloned().collect()
    }
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Keep only safe scalar props.
///
/// Keys that look like personal data are dropped. Strings are cut to
/// [`MAX_PROP_CHARS`]. Numbers and booleans pass through. Anything else,
/// including a non-object `props`, is dropped.
pub fn sanitize_props(props: Option<&Json>) -> PropertyMap {
    let mut out = PropertyMap::new();
    let Some(Json::Object(map)) = props else {
        return out;
    };
    for (key, value) in map {
        if SENSITIVE_KEY_RE.is_match(key) {
            continue;
        }
        let kept = match value {
            Json::String(s) => Value::String(s.chars().take(MAX_PROP_CHARS).collect()),
            Json::Number(_) | Json::Bool(_) => Value::from(value.clone()),
            _ => continue,
        };
        out.insert(key.clone(), kept);
    }
    out
}
