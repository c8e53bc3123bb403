//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum ParamError {
    // ─────────────────────────────────────────────────────────────
    // Contract violations (PARAM-001 to PARAM-002)
    // ─────────────────────────────────────────────────────────────

    #[error("PARAM-001: Invocation created without a runtime context: {details}")]
    MissingContext { details: String },

    #[error("PARAM-002: Cannot emit {emission}: the invocation has already completed")]
    InvocationCompleted { emission: &'static str },

    // ─────────────────────────────────────────────────────────────
    // Binding validation errors (PARAM-010 to PARAM-016)
    // ─────────────────────────────────────────────────────────────

    #[error("PARAM-010: Cannot bind parameter '{parameter}': '{value}' is not a valid variable name")]
    InvalidVariableName { parameter: String, value: String },

    #[error("PARAM-011: Cannot bind parameter '{parameter}': {value} is negative")]
    NegativeOutBuffer { parameter: String, value: i128 },

    #[error("PARAM-012: Cannot bind parameter '{parameter}': {value} exceeds the maximum of {max}")]
    OutBufferTooLarge {
        parameter: String,
        value: i128,
        max: i64,
    },

    #[error("PARAM-013: '{name}' is not a common parameter")]
    UnknownParameter { name: String },

    #[error("PARAM-014: Cannot bind parameter '{parameter}': expected {expected}, got {got}")]
    TypeMismatch {
        parameter: String,
        expected: &'static str,
        got: String,
    },

    #[error("PARAM-015: Cannot bind parameter '{parameter}': '{value}' is not an action preference")]
    InvalidActionPreference { parameter: String, value: String },

    #[error("PARAM-016: Cannot bind parameter '{parameter}': {value} is not allowed (allowed: {allowed})")]
    PreferenceNotAllowed {
        parameter: String,
        value: String,
        allowed: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Declaration errors (PARAM-020)
    // ─────────────────────────────────────────────────────────────

    #[error("PARAM-020: Command parameter '{name}' collides with common parameter '{common}'")]
    ParameterCollision { name: String, common: String },

    // ─────────────────────────────────────────────────────────────
    // Commit errors (PARAM-030)
    // ─────────────────────────────────────────────────────────────

    #[error("PARAM-030: Cannot write variable '{variable}': caller scope is no longer valid")]
    ScopeClosed { variable: String },

    // ─────────────────────────────────────────────────────────────
    // Input errors
    // ─────────────────────────────────────────────────────────────

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParamError {
    /// Whether this error comes from validating a user-supplied value
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ParamError::InvalidVariableName { .. }
                | ParamError::NegativeOutBuffer { .. }
                | ParamError::OutBufferTooLarge { .. }
                | ParamError::UnknownParameter { .. }
                | ParamError::TypeMismatch { .. }
                | ParamError::InvalidActionPreference { .. }
                | ParamError::PreferenceNotAllowed { .. }
        )
    }

    /// Parameter the error is attached to, if any
    pub fn parameter(&self) -> Option<&str> {
        match self {
            ParamError::InvalidVariableName { parameter, .. }
            | ParamError::NegativeOutBuffer { parameter, .. }
            | ParamError::OutBufferTooLarge { parameter, .. }
            | ParamError::TypeMismatch { parameter, .. }
            | ParamError::InvalidActionPreference { parameter, .. }
            | ParamError::PreferenceNotAllowed { parameter, .. } => Some(parameter.as_str()),
            ParamError::UnknownParameter { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

impl FixSuggestion for ParamError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ParamError::MissingContext { .. } | ParamError::InvocationCompleted { .. } => None,
            ParamError::InvalidVariableName { .. } => Some(
                "Use a bare variable name like 'errs' (or '+errs' to append), without '$', scope prefixes, or paths",
            ),
            ParamError::NegativeOutBuffer { .. } => Some("OutBuffer must be 0 or greater"),
            ParamError::OutBufferTooLarge { .. } => {
                Some("Use a smaller OutBuffer value (at most 2147483647)")
            }
            ParamError::UnknownParameter { .. } => {
                Some("Run `common-params params` to list the common parameters and their aliases")
            }
            ParamError::TypeMismatch { .. } => {
                Some("Switches take true/false, variables take a name, OutBuffer takes an integer")
            }
            ParamError::InvalidActionPreference { .. } => Some(
                "Use one of: Continue, Stop, SilentlyContinue, Inquire, Ignore, Suspend, Break",
            ),
            ParamError::PreferenceNotAllowed { .. } => {
                Some("Pick a value from the allowed list, or widen `legal:` in the config file")
            }
            ParamError::ParameterCollision { .. } => {
                Some("Rename the command parameter; common parameter names and aliases are reserved")
            }
            ParamError::ScopeClosed { .. } => {
                Some("Complete the invocation before tearing down the caller scope")
            }
            ParamError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ParamError::Json(_) => None,
            ParamError::Io(_) => Some("Check file path and permissions"),
        }
    }
}
