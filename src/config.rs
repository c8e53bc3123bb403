//! Configuration of ambient preferences and legal preference sets
//!
//! ```yaml
//! preferences:
//!   error_action: Continue
//!   warning_action: Continue
//!   information_action: SilentlyContinue
//!   verbose: false
//!   debug: false
//! legal:
//!   information: [Continue, SilentlyContinue, Stop, Inquire, Ignore, Break]
//! ```
//!
//! `COMMON_PARAMS_*` environment variables override the file.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::{AmbientPreferences, InvocationContext};
use crate::error::ParamError;
use crate::preference::{parse_preference, LegalPreferences, PreferenceChannel};
use crate::scope::VariableScope;

pub const ENV_ERROR_ACTION: &str = "COMMON_PARAMS_ERROR_ACTION";
pub const ENV_WARNING_ACTION: &str = "COMMON_PARAMS_WARNING_ACTION";
pub const ENV_INFORMATION_ACTION: &str = "COMMON_PARAMS_INFORMATION_ACTION";
pub const ENV_VERBOSE: &str = "COMMON_PARAMS_VERBOSE";
pub const ENV_DEBUG: &str = "COMMON_PARAMS_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preferences: AmbientPreferences,
    pub legal: LegalPreferences,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ParamError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply `COMMON_PARAMS_*` overrides from the process environment
    pub fn with_env(self) -> Result<Self, ParamError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment, in practice)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ParamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, channel) in [
            (ENV_ERROR_ACTION, PreferenceChannel::Error),
            (ENV_WARNING_ACTION, PreferenceChannel::Warning),
            (ENV_INFORMATION_ACTION, PreferenceChannel::Information),
        ] {
            if let Some(raw) = lookup(key) {
                let pref = parse_preference(key, &raw)?;
                match channel {
                    PreferenceChannel::Error => self.preferences.error_action = pref,
                    PreferenceChannel::Warning => self.preferences.warning_action = pref,
                    PreferenceChannel::Information => self.preferences.information_action = pref,
                }
            }
        }
        if let Some(raw) = lookup(ENV_VERBOSE) {
            self.preferences.verbose = parse_flag(ENV_VERBOSE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            self.preferences.debug = parse_flag(ENV_DEBUG, &raw)?;
        }
        Ok(self)
    }

    /// Build an invocation context writing into `scope`
    pub fn context(&self, scope: Arc<dyn VariableScope>) -> InvocationContext {
        InvocationContext::new(scope)
            .with_ambient(self.preferences.clone())
            .with_legal(self.legal.clone())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ParamError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ParamError::TypeMismatch {
            parameter: key.to_string(),
            expected: "switch",
            got: raw.to_string(),
        }),
    }
}
