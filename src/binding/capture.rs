//! Capture bindings: which variable each channel writes into

use serde::Serialize;
use tracing::trace;

use super::validate::validate_variable_name;
use crate::error::ParamError;

/// Prefix that switches a capture binding to append mode
pub const APPEND_PREFIX: char = '+';

/// Channels whose items can be captured into a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureChannel {
    Error,
    Warning,
    Information,
    Output,
    Pipeline,
}

impl CaptureChannel {
    pub const ALL: [CaptureChannel; 5] = [
        CaptureChannel::Error,
        CaptureChannel::Warning,
        CaptureChannel::Information,
        CaptureChannel::Output,
        CaptureChannel::Pipeline,
    ];

    /// Name of the common parameter that binds this channel
    pub fn parameter_name(&self) -> &'static str {
        match self {
            CaptureChannel::Error => "ErrorVariable",
            CaptureChannel::Warning => "WarningVariable",
            CaptureChannel::Information => "InformationVariable",
            CaptureChannel::Output => "OutVariable",
            CaptureChannel::Pipeline => "PipelineVariable",
        }
    }

    /// List channels accumulate a sequence; the pipeline channel holds one item
    pub fn is_list(&self) -> bool {
        !matches!(self, CaptureChannel::Pipeline)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A validated capture target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableReference {
    pub target_name: String,
    pub append: bool,
}

impl VariableReference {
    /// Parse a raw capture value for `parameter`
    ///
    /// A leading `+` selects append mode and is stripped; the rest must be a
    /// simple variable name.
    pub fn parse(parameter: &str, raw: &str) -> Result<Self, ParamError> {
        let (append, name) = match raw.strip_prefix(APPEND_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        validate_variable_name(parameter, raw, name)?;
        Ok(Self {
            target_name: name.to_string(),
            append,
        })
    }

    /// Raw form, as it would be written on the command line
    pub fn to_raw(&self) -> String {
        if self.append {
            format!("{}{}", APPEND_PREFIX, self.target_name)
        } else {
            self.target_name.clone()
        }
    }
}

/// Per-channel capture bindings of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBindings {
    slots: [Option<VariableReference>; 5],
}

impl CaptureBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or with `None`, unbind) a channel
    ///
    /// Validation happens before anything is stored, so a rejected value
    /// leaves the previous binding in place.
    pub fn set(&mut self, channel: CaptureChannel, raw: Option<&str>) -> Result<(), ParamError> {
        let binding = match raw {
            Some(raw) => Some(VariableReference::parse(channel.parameter_name(), raw)?),
            None => None,
        };
        trace!(?channel, ?binding, "capture binding set");
        self.slots[channel.index()] = binding;
        Ok(())
    }

    /// Store an already validated binding
    pub fn set_reference(&mut self, channel: CaptureChannel, binding: Option<VariableReference>) {
        self.slots[channel.index()] = binding;
    }

    pub fn get(&self, channel: CaptureChannel) -> Option<&VariableReference> {
        self.slots[channel.index()].as_ref()
    }

    /// Raw form of a channel's binding
    pub fn get_raw(&self, channel: CaptureChannel) -> Option<String> {
        self.get(channel).map(VariableReference::to_raw)
    }

    /// Bound channels with their targets
    pub fn iter(&self) -> impl Iterator<Item = (CaptureChannel, &VariableReference)> {
        CaptureChannel::ALL
            .into_iter()
            .filter_map(|c| self.get(c).map(|r| (c, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
