//! Invocation scripts
//!
//! A YAML description of one simulated command invocation: the common
//! arguments it was called with, the caller scope before the call, and the
//! sequence of emissions the command body makes.
//!
//! ```yaml
//! arguments: [-ErrorVariable, +errs, -ea, SilentlyContinue]
//! scope:
//!   errs: [earlier]
//! steps:
//!   - pipeline: {name: a}
//!   - error: disk full
//!   - set_action: {channel: error, preference: Stop}
//!   - error: fatal
//!   - output: 42
//!   - end_pipeline
//! ```
//!
//! Steps are single-key maps (or a bare name for `end_pipeline`) rather than
//! YAML `!tags`.
//!
//! The script runner plays the engine's part: it stops the body when an
//! event resolves to `Stop`, then completes the invocation.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::args::parse_tokens;
use crate::config::Config;
use crate::error::ParamError;
use crate::invocation::{Invocation, Outcome};
use crate::preference::{ActionPreference, PreferenceChannel};
use crate::scope::Scope;

/// One emission made by the command body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Error(Value),
    Warning(Value),
    Information(Value),
    Output(Value),
    Pipeline(Value),
    EndPipeline,
    Verbose(String),
    Debug(String),
    SetAction {
        channel: PreferenceChannel,
        preference: ActionPreference,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvocationScript {
    /// Argument tokens, e.g. `[-ErrorVariable, errs]`
    pub arguments: Vec<Value>,
    /// Caller scope before the invocation
    pub scope: Map<String, Value>,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

/// Result of running a script
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub parameters: Value,
    /// Set when an event resolved to `Stop`
    pub stopped: Option<Outcome>,
    pub emissions: Value,
    pub scope: Value,
}

impl InvocationScript {
    pub fn from_yaml(yaml: &str) -> Result<Self, ParamError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Argument tokens as strings
    pub fn tokens(&self) -> Vec<String> {
        self.arguments
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    /// Run the script against a fresh scope built from `scope:`
    pub fn run(&self, config: &Config) -> Result<ScriptReport, ParamError> {
        let scope = Scope::with_variables(self.scope.clone());
        let args = parse_tokens(&self.tokens())?;
        let mut invocation = Invocation::bind(
            config.context(Arc::new(scope.clone())),
            args.iter().map(|(n, v)| (n.as_str(), v)),
        )?;
        debug!(steps = self.steps.len(), "arguments bound, running body");

        let mut stopped = None;
        for step in &self.steps {
            if let Some(outcome) = apply_step(&mut invocation, step)? {
                if outcome.should_stop() {
                    info!(channel = ?outcome.channel, "invocation stopped by action preference");
                    stopped = Some(outcome);
                    break;
                }
            }
        }
        invocation.complete()?;

        Ok(ScriptReport {
            parameters: invocation.parameters().to_json(&invocation.context().ambient),
            stopped,
            emissions: invocation.log().to_json()?,
            scope: scope.to_json(),
        })
    }
}

fn apply_step(invocation: &mut Invocation, step: &Step) -> Result<Option<Outcome>, ParamError> {
    let outcome = match step {
        Step::Error(v) => Some(invocation.write_error(v.clone())?),
        Step::Warning(v) => Some(invocation.write_warning(v.clone())?),
        Step::Information(v) => Some(invocation.write_information(v.clone())?),
        Step::Output(v) => {
            invocation.write_output(v.clone())?;
            None
        }
        Step::Pipeline(v) => {
            invocation.begin_pipeline_item(v.clone())?;
            None
        }
        Step::EndPipeline => {
            invocation.end_pipeline()?;
            None
        }
        Step::Verbose(m) => {
            invocation.write_verbose(m.clone());
            None
        }
        Step::Debug(m) => {
            invocation.write_debug(m.clone());
            None
        }
        Step::SetAction {
            channel,
            preference,
        } => {
            invocation.set_action(*channel, *preference)?;
            None
        }
    };
    Ok(outcome)
}

impl ScriptReport {
    pub fn to_json(&self) -> Value {
        json!({
            "parameters": self.parameters,
            "stopped": self.stopped,
            "emissions": self.emissions,
            "scope": self.scope,
        })
    }
}
