//! Capture recorder - commits emitted items into bound variables
//!
//! List channels (error, warning, information, output):
//! - replace mode: the first write of the invocation starts a fresh sequence,
//!   later writes append to it
//! - append mode: the first write starts from the variable's existing content
//!
//! The pipeline channel replaces the variable with each item, and the
//! variable is removed once the pipeline stops streaming.
//!
//! Writes go straight through to the scope, so a cancelled invocation keeps
//! whatever was captured before it stopped. After the first write each item
//! is appended to the stored sequence in place. Sequences are keyed by target
//! name: two channels bound to the same variable share one sequence.

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{debug, trace};

use super::capture::{CaptureBindings, CaptureChannel};
use crate::error::ParamError;
use crate::scope::VariableScope;

/// Per-invocation capture state
#[derive(Debug, Clone, Default)]
pub struct CaptureRecorder {
    /// Sequences started this invocation: target name → items committed
    sequences: FxHashMap<String, usize>,
}

impl CaptureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item` emitted on `channel`
    ///
    /// Returns `Ok(false)` when the channel is unbound. A failed write leaves
    /// the recorder untouched.
    pub fn record(
        &mut self,
        bindings: &CaptureBindings,
        channel: CaptureChannel,
        item: &Value,
        scope: &dyn VariableScope,
    ) -> Result<bool, ParamError> {
        let Some(binding) = bindings.get(channel) else {
            return Ok(false);
        };
        let name = binding.target_name.as_str();

        if !channel.is_list() {
            trace!(variable = name, "pipeline variable updated");
            scope.write_variable(name, item.clone())?;
            return Ok(true);
        }

        match self.sequences.get_mut(name) {
            Some(count) => {
                scope.append_variable(name, item.clone())?;
                *count += 1;
            }
            None => {
                if binding.append {
                    scope.append_variable(name, item.clone())?;
                } else {
                    scope.write_variable(name, Value::Array(vec![item.clone()]))?;
                }
                self.sequences.insert(name.to_string(), 1);
            }
        }
        trace!(variable = name, ?channel, "captured item");
        Ok(true)
    }

    /// Remove the pipeline variable once the pipeline stops streaming
    ///
    /// A target shared with a list channel is left alone. Returns whether a
    /// variable was removed.
    pub fn clear_pipeline(
        &self,
        bindings: &CaptureBindings,
        scope: &dyn VariableScope,
    ) -> Result<bool, ParamError> {
        let Some(binding) = bindings.get(CaptureChannel::Pipeline) else {
            return Ok(false);
        };
        let shared = bindings
            .iter()
            .any(|(channel, other)| channel.is_list() && other.target_name == binding.target_name);
        if shared {
            return Ok(false);
        }
        debug!(variable = %binding.target_name, "pipeline ended, removing variable");
        scope.remove_variable(&binding.target_name)?;
        Ok(true)
    }

    /// Finish the invocation
    ///
    /// Replace-mode list bindings that never saw an item still clear their
    /// variable to an empty sequence.
    pub fn finish(
        &mut self,
        bindings: &CaptureBindings,
        scope: &dyn VariableScope,
    ) -> Result<(), ParamError> {
        for (channel, binding) in bindings.iter() {
            if !channel.is_list() || binding.append {
                continue;
            }
            if !self.sequences.contains_key(&binding.target_name) {
                debug!(variable = %binding.target_name, ?channel, "no items captured, clearing");
                scope.write_variable(&binding.target_name, Value::Array(Vec::new()))?;
                self.sequences.insert(binding.target_name.clone(), 0);
            }
        }
        Ok(())
    }

    /// Number of items this invocation committed into `name`
    pub fn captured_count(&self, name: &str) -> Option<usize> {
        self.sequences.get(name).copied()
    }
}
