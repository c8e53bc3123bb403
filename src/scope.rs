//! Caller scope: where captured variables land
//!
//! The invocation only needs to read, write, append to and remove variables;
//! `Scope` is a concrete store with DashMap for lock-free access. A scope that has been
//! torn down rejects writes with `ScopeClosed` instead of silently dropping
//! them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::error::ParamError;

/// Variable storage consumed by the capture machinery
pub trait VariableScope: Send + Sync {
    /// Current value of `name`, if set
    fn read_variable(&self, name: &str) -> Option<Value>;

    /// Store `value` under `name`
    fn write_variable(&self, name: &str, value: Value) -> Result<(), ParamError>;

    /// Push `item` onto the sequence stored under `name`
    ///
    /// A missing or `null` value starts an empty sequence; a scalar becomes
    /// its first element. Stores that can grow the value in place should
    /// override this.
    fn append_variable(&self, name: &str, item: Value) -> Result<(), ParamError> {
        let mut items = into_sequence(self.read_variable(name).unwrap_or(Value::Null));
        items.push(item);
        self.write_variable(name, Value::Array(items))
    }

    /// Remove `name`; removing an unset variable is not an error
    fn remove_variable(&self, name: &str) -> Result<(), ParamError>;
}

/// Existing variable content as a sequence to append to
pub(crate) fn into_sequence(current: Value) -> Vec<Value> {
    match current {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Thread-safe variable store for one caller scope
#[derive(Clone, Default)]
pub struct Scope {
    /// Variables: name → value
    vars: Arc<DashMap<String, Value>>,
    /// Set once the scope is torn down
    closed: Arc<AtomicBool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope pre-populated with `vars`
    pub fn with_variables<I, K>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let scope = Self::new();
        for (k, v) in vars {
            scope.vars.insert(k.into(), v);
        }
        scope
    }

    /// Tear the scope down; later writes fail with `ScopeClosed`
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Snapshot as a JSON object (sorted keys)
    pub fn to_json(&self) -> Value {
        let mut entries: Vec<(String, Value)> = self
            .vars
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Object(entries.into_iter().collect::<Map<_, _>>())
    }
}

impl VariableScope for Scope {
    fn read_variable(&self, name: &str) -> Option<Value> {
        self.vars.get(name).map(|v| v.clone())
    }

    fn write_variable(&self, name: &str, value: Value) -> Result<(), ParamError> {
        self.ensure_open(name)?;
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    fn append_variable(&self, name: &str, item: Value) -> Result<(), ParamError> {
        self.ensure_open(name)?;
        let mut entry = self.vars.entry(name.to_string()).or_insert(Value::Null);
        match &mut *entry {
            Value::Array(items) => items.push(item),
            slot => {
                let mut items = into_sequence(slot.take());
                items.push(item);
                *slot = Value::Array(items);
            }
        }
        Ok(())
    }

    fn remove_variable(&self, name: &str) -> Result<(), ParamError> {
        self.ensure_open(name)?;
        self.vars.remove(name);
        Ok(())
    }
}

impl Scope {
    fn ensure_open(&self, name: &str) -> Result<(), ParamError> {
        if self.is_closed() {
            return Err(ParamError::ScopeClosed {
                variable: name.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
