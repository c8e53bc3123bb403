//! Command-line style argument tokens
//!
//! `-Name value`, `-Name:value`, and bare switches (`-Verbose`). Switches never
//! consume the following token; use `-Verbose:false` to turn one off.
//! `$null` as a value clears a variable binding and turns a switch off.

use serde_json::Value;

use crate::error::ParamError;
use crate::params::{lookup, ParameterKind};

const NULL_LITERAL: &str = "$null";

/// Parse tokens into (name, raw value) pairs for common parameters
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<(String, Value)>, ParamError> {
    let mut out = Vec::new();
    let mut iter = tokens.iter().map(|t| t.as_ref());

    while let Some(token) = iter.next() {
        let Some(body) = token.strip_prefix('-') else {
            return Err(ParamError::UnknownParameter {
                name: token.to_string(),
            });
        };
        let (name, inline) = match body.split_once(':') {
            Some((n, v)) => (n, Some(v)),
            None => (body, None),
        };
        let decl = lookup(name).ok_or_else(|| ParamError::UnknownParameter {
            name: name.to_string(),
        })?;

        let raw = match (inline, decl.kind) {
            (Some(v), ParameterKind::Switch(_)) if is_null_literal(v) => Value::Bool(false),
            (Some(v), _) => literal(v),
            (None, ParameterKind::Switch(_)) => Value::Bool(true),
            (None, _) => match iter.next() {
                Some(v) => literal(v),
                None => {
                    return Err(ParamError::TypeMismatch {
                        parameter: decl.name.to_string(),
                        expected: decl.kind.type_name(),
                        got: "nothing".to_string(),
                    })
                }
            },
        };
        out.push((decl.name.to_string(), raw));
    }
    Ok(out)
}

fn is_null_literal(raw: &str) -> bool {
    raw.eq_ignore_ascii_case(NULL_LITERAL)
}

fn literal(raw: &str) -> Value {
    if is_null_literal(raw) {
        Value::Null
    } else {
        Value::String(raw.to_string())
    }
}
