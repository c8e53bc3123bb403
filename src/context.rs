//! Invocation context: everything an invocation inherits from its caller
//!
//! Ambient preferences are passed in explicitly rather than read from a
//! process-wide session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::preference::{ActionPreference, LegalPreferences, PreferenceChannel};
use crate::scope::VariableScope;

/// Defaults that apply when no explicit common parameter overrides them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientPreferences {
    pub error_action: ActionPreference,
    pub warning_action: ActionPreference,
    pub information_action: ActionPreference,
    pub verbose: bool,
    pub debug: bool,
}

impl Default for AmbientPreferences {
    fn default() -> Self {
        Self {
            error_action: ActionPreference::Continue,
            warning_action: ActionPreference::Continue,
            information_action: ActionPreference::SilentlyContinue,
            verbose: false,
            debug: false,
        }
    }
}

impl AmbientPreferences {
    /// Ambient preference for `channel`
    pub fn preference(&self, channel: PreferenceChannel) -> ActionPreference {
        match channel {
            PreferenceChannel::Error => self.error_action,
            PreferenceChannel::Warning => self.warning_action,
            PreferenceChannel::Information => self.information_action,
        }
    }
}

/// Caller-supplied runtime context for one invocation
#[derive(Clone, Default)]
pub struct InvocationContext {
    pub ambient: AmbientPreferences,
    pub legal: LegalPreferences,
    scope: Option<Arc<dyn VariableScope>>,
}

impl InvocationContext {
    /// Context with default preferences writing into `scope`
    pub fn new(scope: Arc<dyn VariableScope>) -> Self {
        Self {
            scope: Some(scope),
            ..Self::default()
        }
    }

    pub fn with_ambient(mut self, ambient: AmbientPreferences) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_legal(mut self, legal: LegalPreferences) -> Self {
        self.legal = legal;
        self
    }

    pub fn with_scope(mut self, scope: Arc<dyn VariableScope>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn scope(&self) -> Option<&Arc<dyn VariableScope>> {
        self.scope.as_ref()
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("ambient", &self.ambient)
            .field("legal", &self.legal)
            .field("has_scope", &self.scope.is_some())
            .finish()
    }
}
