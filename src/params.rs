//! Common parameter set
//!
//! The fixed declaration table every invocation receives, the validators
//! registered per entry, and the per-invocation [`CommonParameters`] that
//! routes bound values into action preferences and capture bindings.
//!
//! | Name                | Alias | Kind                         |
//! |---------------------|-------|------------------------------|
//! | Verbose             | vb    | switch                       |
//! | Debug               | db    | switch                       |
//! | ErrorAction         | ea    | action preference            |
//! | WarningAction       | wa    | action preference            |
//! | InformationAction   | infa  | action preference            |
//! | ErrorVariable       | ev    | capture variable             |
//! | WarningVariable     | wv    | capture variable             |
//! | InformationVariable | iv    | capture variable             |
//! | OutVariable         | ov    | capture variable             |
//! | OutBuffer           | ob    | non-negative integer         |
//! | PipelineVariable    | pv    | capture variable (replace)   |

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::action::ActionPreferences;
use crate::binding::{CaptureBindings, CaptureChannel, VariableReference};
use crate::context::AmbientPreferences;
use crate::error::ParamError;
use crate::preference::{parse_preference, ActionPreference, LegalPreferences, PreferenceChannel};

/// Largest accepted OutBuffer
pub const MAX_OUT_BUFFER: i64 = i32::MAX as i64;

/// Boolean switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Switch {
    Verbose,
    Debug,
}

/// What a common parameter controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "channel", rename_all = "snake_case")]
pub enum ParameterKind {
    Switch(Switch),
    Preference(PreferenceChannel),
    Variable(CaptureChannel),
    OutBuffer,
}

impl ParameterKind {
    /// Type name shown in listings and type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::Switch(_) => "switch",
            ParameterKind::Preference(_) => "action preference",
            ParameterKind::Variable(_) => "variable name",
            ParameterKind::OutBuffer => "non-negative integer",
        }
    }
}

/// A validated common parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonParameterValue {
    Switch(bool),
    Preference(ActionPreference),
    Variable(Option<VariableReference>),
    Count(u32),
}

/// Turns a raw argument into a typed value for one declaration
pub type Validator = fn(&ParameterDecl, &Value) -> Result<CommonParameterValue, ParamError>;

/// One row of the declaration table
#[derive(Clone, Copy)]
pub struct ParameterDecl {
    pub name: &'static str,
    pub alias: &'static str,
    pub kind: ParameterKind,
    pub validator: Validator,
}

impl ParameterDecl {
    /// Run this parameter's validator
    pub fn validate(&self, raw: &Value) -> Result<CommonParameterValue, ParamError> {
        (self.validator)(self, raw)
    }
}

impl std::fmt::Debug for ParameterDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterDecl")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Declaration table attached to every invocation
pub static COMMON_PARAMETERS: [ParameterDecl; 11] = [
    ParameterDecl {
        name: "Verbose",
        alias: "vb",
        kind: ParameterKind::Switch(Switch::Verbose),
        validator: validate_switch,
    },
    ParameterDecl {
        name: "Debug",
        alias: "db",
        kind: ParameterKind::Switch(Switch::Debug),
        validator: validate_switch,
    },
    ParameterDecl {
        name: "ErrorAction",
        alias: "ea",
        kind: ParameterKind::Preference(PreferenceChannel::Error),
        validator: validate_preference,
    },
    ParameterDecl {
        name: "WarningAction",
        alias: "wa",
        kind: ParameterKind::Preference(PreferenceChannel::Warning),
        validator: validate_preference,
    },
    ParameterDecl {
        name: "InformationAction",
        alias: "infa",
        kind: ParameterKind::Preference(PreferenceChannel::Information),
        validator: validate_preference,
    },
    ParameterDecl {
        name: "ErrorVariable",
        alias: "ev",
        kind: ParameterKind::Variable(CaptureChannel::Error),
        validator: validate_variable,
    },
    ParameterDecl {
        name: "WarningVariable",
        alias: "wv",
        kind: ParameterKind::Variable(CaptureChannel::Warning),
        validator: validate_variable,
    },
    ParameterDecl {
        name: "InformationVariable",
        alias: "iv",
        kind: ParameterKind::Variable(CaptureChannel::Information),
        validator: validate_variable,
    },
    ParameterDecl {
        name: "OutVariable",
        alias: "ov",
        kind: ParameterKind::Variable(CaptureChannel::Output),
        validator: validate_variable,
    },
    ParameterDecl {
        name: "OutBuffer",
        alias: "ob",
        kind: ParameterKind::OutBuffer,
        validator: validate_out_buffer,
    },
    ParameterDecl {
        name: "PipelineVariable",
        alias: "pv",
        kind: ParameterKind::Variable(CaptureChannel::Pipeline),
        validator: validate_variable,
    },
];

/// Lowercased name or alias → declaration, built once
static LOOKUP: Lazy<FxHashMap<String, &'static ParameterDecl>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for decl in COMMON_PARAMETERS.iter() {
        map.insert(decl.name.to_ascii_lowercase(), decl);
        map.insert(decl.alias.to_ascii_lowercase(), decl);
    }
    map
});

/// Resolve a name or alias (case-insensitive)
pub fn lookup(name: &str) -> Option<&'static ParameterDecl> {
    LOOKUP.get(&name.to_ascii_lowercase()).copied()
}

pub fn is_common_parameter(name: &str) -> bool {
    lookup(name).is_some()
}

/// Reject a command signature that reuses a common name or alias
pub fn check_collisions<'a, I>(command_parameters: I) -> Result<(), ParamError>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in command_parameters {
        if let Some(decl) = lookup(name) {
            return Err(ParamError::ParameterCollision {
                name: name.to_string(),
                common: decl.name.to_string(),
            });
        }
    }
    Ok(())
}

/// Partition named arguments into (common, command-specific)
pub fn split_arguments<I>(args: I) -> (Vec<(String, Value)>, Vec<(String, Value)>)
where
    I: IntoIterator<Item = (String, Value)>,
{
    args.into_iter().partition(|(name, _)| is_common_parameter(name))
}

// ═══════════════════════════════════════════════════════════════
// Validators
// ═══════════════════════════════════════════════════════════════

fn type_mismatch(decl: &ParameterDecl, raw: &Value) -> ParamError {
    let got = match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ParamError::TypeMismatch {
        parameter: decl.name.to_string(),
        expected: decl.kind.type_name(),
        got: got.to_string(),
    }
}

/// `true`/`false`; `null` means the switch was given without a value
fn validate_switch(decl: &ParameterDecl, raw: &Value) -> Result<CommonParameterValue, ParamError> {
    match raw {
        Value::Null => Ok(CommonParameterValue::Switch(true)),
        Value::Bool(b) => Ok(CommonParameterValue::Switch(*b)),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(CommonParameterValue::Switch(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => {
            Ok(CommonParameterValue::Switch(false))
        }
        other => Err(type_mismatch(decl, other)),
    }
}

/// Preference name (any case) or its numeric form
fn validate_preference(
    decl: &ParameterDecl,
    raw: &Value,
) -> Result<CommonParameterValue, ParamError> {
    match raw {
        Value::String(s) => parse_preference(decl.name, s).map(CommonParameterValue::Preference),
        Value::Number(n) => parse_preference(decl.name, &n.to_string())
            .map(CommonParameterValue::Preference),
        other => Err(type_mismatch(decl, other)),
    }
}

/// Variable name with optional `+`; `null` removes the binding
fn validate_variable(decl: &ParameterDecl, raw: &Value) -> Result<CommonParameterValue, ParamError> {
    match raw {
        Value::Null => Ok(CommonParameterValue::Variable(None)),
        Value::String(s) => {
            VariableReference::parse(decl.name, s).map(|r| CommonParameterValue::Variable(Some(r)))
        }
        other => Err(type_mismatch(decl, other)),
    }
}

/// Integer in `0..=i32::MAX`, given as a number or numeric string
fn validate_out_buffer(
    decl: &ParameterDecl,
    raw: &Value,
) -> Result<CommonParameterValue, ParamError> {
    let value = match raw {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
    .ok_or_else(|| type_mismatch(decl, raw))?;
    check_out_buffer(decl.name, value).map(CommonParameterValue::Count)
}

fn check_out_buffer(parameter: &str, value: i128) -> Result<u32, ParamError> {
    if value < 0 {
        return Err(ParamError::NegativeOutBuffer {
            parameter: parameter.to_string(),
            value,
        });
    }
    if value > i128::from(MAX_OUT_BUFFER) {
        return Err(ParamError::OutBufferTooLarge {
            parameter: parameter.to_string(),
            value,
            max: MAX_OUT_BUFFER,
        });
    }
    Ok(value as u32)
}

// ═══════════════════════════════════════════════════════════════
// Per-invocation set
// ═══════════════════════════════════════════════════════════════

/// Common parameter values bound for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonParameters {
    preferences: ActionPreferences,
    captures: CaptureBindings,
    out_buffer: Option<u32>,
}

impl CommonParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind one argument by name or alias
    ///
    /// Nothing is changed unless the value validates.
    pub fn bind(
        &mut self,
        name: &str,
        raw: &Value,
        legal: &LegalPreferences,
    ) -> Result<&'static ParameterDecl, ParamError> {
        let decl = lookup(name).ok_or_else(|| ParamError::UnknownParameter {
            name: name.to_string(),
        })?;
        let value = decl.validate(raw)?;
        self.apply(decl, value, legal)?;
        debug!(parameter = decl.name, raw = %raw, "common parameter bound");
        Ok(decl)
    }

    /// Bind a whole argument list; on any failure the set is left untouched
    #[instrument(skip_all)]
    pub fn bind_all<'a, I>(&mut self, args: I, legal: &LegalPreferences) -> Result<(), ParamError>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut staged = self.clone();
        for (name, raw) in args {
            staged.bind(name, raw, legal)?;
        }
        *self = staged;
        Ok(())
    }

    /// Route a validated value to its component
    pub fn apply(
        &mut self,
        decl: &ParameterDecl,
        value: CommonParameterValue,
        legal: &LegalPreferences,
    ) -> Result<(), ParamError> {
        match (decl.kind, value) {
            (ParameterKind::Switch(Switch::Verbose), CommonParameterValue::Switch(on)) => {
                self.preferences.set_verbose(on)
            }
            (ParameterKind::Switch(Switch::Debug), CommonParameterValue::Switch(on)) => {
                self.preferences.set_debug(on)
            }
            (ParameterKind::Preference(channel), CommonParameterValue::Preference(pref)) => {
                legal.check(channel, pref)?;
                self.preferences.set_action(channel, pref);
            }
            (ParameterKind::Variable(channel), CommonParameterValue::Variable(binding)) => {
                self.captures.set_reference(channel, binding)
            }
            (ParameterKind::OutBuffer, CommonParameterValue::Count(n)) => self.out_buffer = Some(n),
            (kind, value) => {
                return Err(ParamError::TypeMismatch {
                    parameter: decl.name.to_string(),
                    expected: kind.type_name(),
                    got: format!("{value:?}"),
                })
            }
        }
        Ok(())
    }

    pub fn preferences(&self) -> &ActionPreferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut ActionPreferences {
        &mut self.preferences
    }

    pub fn captures(&self) -> &CaptureBindings {
        &self.captures
    }

    /// Set (or clear) a capture channel from its raw form
    pub fn set_capture(&mut self, channel: CaptureChannel, raw: Option<&str>) -> Result<(), ParamError> {
        self.captures.set(channel, raw)
    }

    pub fn out_buffer(&self) -> Option<u32> {
        self.out_buffer
    }

    pub fn set_out_buffer(&mut self, value: i64) -> Result<(), ParamError> {
        self.out_buffer = Some(check_out_buffer("OutBuffer", value.into())?);
        Ok(())
    }

    /// Effective values as JSON, resolving unset preferences against `ambient`
    pub fn to_json(&self, ambient: &AmbientPreferences) -> Value {
        let captures: serde_json::Map<String, Value> = CaptureChannel::ALL
            .iter()
            .map(|c| {
                let raw = self.captures.get_raw(*c).map(Value::String).unwrap_or(Value::Null);
                (c.parameter_name().to_string(), raw)
            })
            .collect();
        json!({
            "Verbose": self.preferences.verbose(ambient),
            "Debug": self.preferences.debug(ambient),
            "ErrorAction": self.preferences.action(PreferenceChannel::Error, ambient),
            "WarningAction": self.preferences.action(PreferenceChannel::Warning, ambient),
            "InformationAction": self.preferences.action(PreferenceChannel::Information, ambient),
            "OutBuffer": self.out_buffer,
            "Variables": captures,
        })
    }
}
