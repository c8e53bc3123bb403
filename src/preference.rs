//! Action preferences and the channels they govern
//!
//! An action preference is the policy the runtime applies when an error,
//! warning or informational event is emitted. Which values are legal on which
//! channel is configuration ([`LegalPreferences`]), not a property of the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Runtime response to an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionPreference {
    SilentlyContinue,
    Stop,
    Continue,
    Inquire,
    Ignore,
    Suspend,
    Break,
}

impl ActionPreference {
    /// All values, in numeric order
    pub const ALL: [ActionPreference; 7] = [
        ActionPreference::SilentlyContinue,
        ActionPreference::Stop,
        ActionPreference::Continue,
        ActionPreference::Inquire,
        ActionPreference::Ignore,
        ActionPreference::Suspend,
        ActionPreference::Break,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPreference::SilentlyContinue => "SilentlyContinue",
            ActionPreference::Stop => "Stop",
            ActionPreference::Continue => "Continue",
            ActionPreference::Inquire => "Inquire",
            ActionPreference::Ignore => "Ignore",
            ActionPreference::Suspend => "Suspend",
            ActionPreference::Break => "Break",
        }
    }

    /// Numeric form (index into [`ActionPreference::ALL`])
    pub fn as_index(&self) -> u8 {
        *self as u8
    }

    /// Whether an event under this preference reaches its normal destination
    pub fn is_displayed(&self) -> bool {
        !matches!(
            self,
            ActionPreference::SilentlyContinue | ActionPreference::Ignore
        )
    }
}

impl fmt::Display for ActionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionPreference {
    type Err = ();

    /// Case-insensitive name, or the numeric form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(idx) = s.parse::<usize>() {
            return Self::ALL.get(idx).copied().ok_or(());
        }
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Event channels that carry an action preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceChannel {
    Error,
    Warning,
    Information,
}

impl PreferenceChannel {
    pub const ALL: [PreferenceChannel; 3] = [
        PreferenceChannel::Error,
        PreferenceChannel::Warning,
        PreferenceChannel::Information,
    ];

    /// Name of the common parameter that sets this channel
    pub fn parameter_name(&self) -> &'static str {
        match self {
            PreferenceChannel::Error => "ErrorAction",
            PreferenceChannel::Warning => "WarningAction",
            PreferenceChannel::Information => "InformationAction",
        }
    }
}

/// Per-channel legal sets of action preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalPreferences {
    pub error: Vec<ActionPreference>,
    pub warning: Vec<ActionPreference>,
    pub information: Vec<ActionPreference>,
}

impl Default for LegalPreferences {
    /// Everything except `Suspend`, which only workflow hosts understand
    fn default() -> Self {
        let common: Vec<ActionPreference> = ActionPreference::ALL
            .iter()
            .copied()
            .filter(|p| *p != ActionPreference::Suspend)
            .collect();
        Self {
            error: common.clone(),
            warning: common.clone(),
            information: common,
        }
    }
}

impl LegalPreferences {
    /// Every value on every channel
    pub fn permissive() -> Self {
        Self {
            error: ActionPreference::ALL.to_vec(),
            warning: ActionPreference::ALL.to_vec(),
            information: ActionPreference::ALL.to_vec(),
        }
    }

    pub fn allowed(&self, channel: PreferenceChannel) -> &[ActionPreference] {
        match channel {
            PreferenceChannel::Error => &self.error,
            PreferenceChannel::Warning => &self.warning,
            PreferenceChannel::Information => &self.information,
        }
    }

    pub fn is_allowed(&self, channel: PreferenceChannel, pref: ActionPreference) -> bool {
        self.allowed(channel).contains(&pref)
    }

    /// Reject `pref` if it is not legal on `channel`
    pub fn check(
        &self,
        channel: PreferenceChannel,
        pref: ActionPreference,
    ) -> Result<(), ParamError> {
        if self.is_allowed(channel, pref) {
            return Ok(());
        }
        let allowed = self
            .allowed(channel)
            .iter()
            .map(ActionPreference::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Err(ParamError::PreferenceNotAllowed {
            parameter: channel.parameter_name().to_string(),
            value: pref.to_string(),
            allowed,
        })
    }
}

/// Parse a raw action preference for `parameter`
pub fn parse_preference(parameter: &str, raw: &str) -> Result<ActionPreference, ParamError> {
    raw.parse()
        .map_err(|_| ParamError::InvalidActionPreference {
            parameter: parameter.to_string(),
            value: raw.to_string(),
        })
}
