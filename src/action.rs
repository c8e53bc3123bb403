//! Explicit action preferences of one invocation
//!
//! Every getter takes the ambient defaults: an unset channel falls back to
//! the invocation context, never to a fixed constant.

use serde::Serialize;

use crate::context::AmbientPreferences;
use crate::preference::{ActionPreference, PreferenceChannel};

/// Values set through `-Verbose`, `-Debug`, `-ErrorAction`, ...
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionPreferences {
    verbose: Option<bool>,
    debug: Option<bool>,
    error: Option<ActionPreference>,
    warning: Option<ActionPreference>,
    information: Option<ActionPreference>,
}

impl ActionPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_verbose(&mut self, on: bool) {
        self.verbose = Some(on);
    }

    pub fn set_debug(&mut self, on: bool) {
        self.debug = Some(on);
    }

    /// Effective verbose switch
    pub fn verbose(&self, ambient: &AmbientPreferences) -> bool {
        self.verbose.unwrap_or(ambient.verbose)
    }

    /// Effective debug switch
    pub fn debug(&self, ambient: &AmbientPreferences) -> bool {
        self.debug.unwrap_or(ambient.debug)
    }

    pub fn set_action(&mut self, channel: PreferenceChannel, pref: ActionPreference) {
        *self.slot_mut(channel) = Some(pref);
    }

    /// Drop an explicit value so the channel follows the ambient default again
    pub fn clear_action(&mut self, channel: PreferenceChannel) {
        *self.slot_mut(channel) = None;
    }

    /// Explicitly set value, if any
    pub fn explicit(&self, channel: PreferenceChannel) -> Option<ActionPreference> {
        match channel {
            PreferenceChannel::Error => self.error,
            PreferenceChannel::Warning => self.warning,
            PreferenceChannel::Information => self.information,
        }
    }

    /// Effective preference for `channel`
    pub fn action(&self, channel: PreferenceChannel, ambient: &AmbientPreferences) -> ActionPreference {
        self.explicit(channel)
            .unwrap_or_else(|| ambient.preference(channel))
    }

    pub fn is_explicit_verbose(&self) -> bool {
        self.verbose.is_some()
    }

    pub fn is_explicit_debug(&self) -> bool {
        self.debug.is_some()
    }

    fn slot_mut(&mut self, channel: PreferenceChannel) -> &mut Option<ActionPreference> {
        match channel {
            PreferenceChannel::Error => &mut self.error,
            PreferenceChannel::Warning => &mut self.warning,
            PreferenceChannel::Information => &mut self.information,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambient() -> AmbientPreferences {
        AmbientPreferences {
            error_action: ActionPreference::Stop,
            warning_action: ActionPreference::Inquire,
            information_action: ActionPreference::Continue,
            verbose: true,
            debug: false,
        }
    }

    #[test]
    fn unset_follows_ambient() {
        let prefs = ActionPreferences::new();
        let amb = ambient();
        assert_eq!(prefs.action(PreferenceChannel::Error, &amb), ActionPreference::Stop);
        assert_eq!(prefs.action(PreferenceChannel::Warning, &amb), ActionPreference::Inquire);
        assert_eq!(
            prefs.action(PreferenceChannel::Information, &amb),
            ActionPreference::Continue
        );
        assert!(prefs.verbose(&amb));
        assert!(!prefs.debug(&amb));

        // A different context gives different answers for the same set
        let quiet = AmbientPreferences::default();
        assert_eq!(prefs.action(PreferenceChannel::Error, &quiet), ActionPreference::Continue);
        assert!(!prefs.verbose(&quiet));
    }

    #[test]
    fn explicit_overrides_ambient() {
        let mut prefs = ActionPreferences::new();
        prefs.set_action(PreferenceChannel::Error, ActionPreference::SilentlyContinue);
        prefs.set_verbose(false);
        prefs.set_debug(true);
        let amb = ambient();
        assert_eq!(
            prefs.action(PreferenceChannel::Error, &amb),
            ActionPreference::SilentlyContinue
        );
        assert_eq!(prefs.action(PreferenceChannel::Warning, &amb), ActionPreference::Inquire);
        assert!(!prefs.verbose(&amb));
        assert!(prefs.debug(&amb));
        assert!(prefs.is_explicit_verbose());
    }

    #[test]
    fn clear_restores_ambient() {
        let mut prefs = ActionPreferences::new();
        prefs.set_action(PreferenceChannel::Warning, ActionPreference::Stop);
        prefs.clear_action(PreferenceChannel::Warning);
        assert_eq!(prefs.explicit(PreferenceChannel::Warning), None);
        assert_eq!(
            prefs.action(PreferenceChannel::Warning, &ambient()),
            ActionPreference::Inquire
        );
    }
}
