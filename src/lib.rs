//! common-params - common parameters for pipeline command invocations
//!
//! Every command invocation implicitly accepts a fixed set of parameters:
//! verbosity switches, per-channel action preferences, capture variables for
//! errors, warnings, information, output and the current pipeline item, and
//! an output buffer count.

pub mod action;
pub mod args;
pub mod binding;
pub mod config;
pub mod context;
pub mod emission_log;
pub mod error;
pub mod invocation;
pub mod job;
pub mod params;
pub mod preference;
pub mod scope;
pub mod script;

pub use action::ActionPreferences;
pub use binding::{is_valid_variable_name, CaptureBindings, CaptureChannel, VariableReference};
pub use config::Config;
pub use context::{AmbientPreferences, InvocationContext};
pub use emission_log::{Emission, EmissionKind, EmissionLog};
pub use error::{FixSuggestion, ParamError};
pub use invocation::{Invocation, Outcome};
pub use job::{JobParameterType, JOB_PARAMETERS};
pub use params::{CommonParameterValue, CommonParameters, ParameterDecl, ParameterKind, COMMON_PARAMETERS};
pub use preference::{ActionPreference, LegalPreferences, PreferenceChannel};
pub use scope::{Scope, VariableScope};
pub use script::{InvocationScript, ScriptReport, Step};
