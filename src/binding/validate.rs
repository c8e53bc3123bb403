//! Capture variable name validation
//!
//! A capture target must be a single simple variable reference:
//! - Letters, digits, underscores, or `?`
//! - No `$` sigil (the name is given bare)
//! - No `:` qualifier (`global:x`, `env:PATH` are scope/drive paths)
//! - No `.` or `[` segments (`a.b`, `a[0]` are member/index expressions)
//!
//! The `+` append prefix is stripped by the caller before validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParamError;

/// Simple variable name: one or more letters, digits, `_` or `?`
static VARIABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{Nd}_?]+$").expect("valid regex"));

/// Check whether `candidate` is a legal simple variable reference
pub fn is_valid_variable_name(candidate: &str) -> bool {
    VARIABLE_NAME.is_match(candidate)
}

/// Validate a capture target for `parameter`
///
/// `raw` is the value as the user wrote it (including any `+`), so the
/// error shows exactly what was rejected.
pub fn validate_variable_name(parameter: &str, raw: &str, candidate: &str) -> Result<(), ParamError> {
    if is_valid_variable_name(candidate) {
        Ok(())
    } else {
        Err(ParamError::InvalidVariableName {
            parameter: parameter.to_string(),
            value: raw.to_string(),
        })
    }
}
