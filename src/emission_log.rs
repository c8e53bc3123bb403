//! Emission log for one invocation
//!
//! Append-only record of what the invocation emitted and how each emission
//! was resolved (effective preference, whether it was captured).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::error::ParamError;
use crate::preference::{ActionPreference, PreferenceChannel};

/// Single logged emission
#[derive(Debug, Clone, Serialize)]
pub struct Emission {
    /// Monotonic sequence ID
    pub id: u64,
    pub kind: EmissionKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmissionKind {
    // ═══════════════════════════════════════════
    // EVENT CHANNELS
    // ═══════════════════════════════════════════
    Event {
        channel: PreferenceChannel,
        item: Value,
        preference: ActionPreference,
        captured: bool,
    },
    Output {
        item: Value,
        captured: bool,
    },
    Verbose {
        message: String,
        displayed: bool,
    },
    Debug {
        message: String,
        displayed: bool,
    },

    // ═══════════════════════════════════════════
    // PIPELINE / LIFECYCLE
    // ═══════════════════════════════════════════
    PipelineItem {
        item: Value,
    },
    PreferenceChanged {
        channel: PreferenceChannel,
        preference: ActionPreference,
    },
    Completed,
}

impl EmissionKind {
    /// Event channel, for error/warning/information emissions
    pub fn channel(&self) -> Option<PreferenceChannel> {
        match self {
            Self::Event { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

/// Thread-safe, append-only emission log
#[derive(Clone, Default)]
pub struct EmissionLog {
    entries: Arc<RwLock<Vec<Emission>>>,
    next_id: Arc<AtomicU64>,
}

impl EmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an emission, returning its ID
    pub fn push(&self, kind: EmissionKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.entries.write().push(Emission { id, kind });
        id
    }

    pub fn entries(&self) -> Vec<Emission> {
        self.entries.read().clone()
    }

    /// Emissions on one event channel
    pub fn filter_channel(&self, channel: PreferenceChannel) -> Vec<Emission> {
        self.entries()
            .into_iter()
            .filter(|e| e.kind.channel() == Some(channel))
            .collect()
    }

    pub fn to_json(&self) -> Result<Value, ParamError> {
        Ok(serde_json::to_value(self.entries())?)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EmissionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmissionLog")
            .field("len", &self.len())
            .finish()
    }
}
