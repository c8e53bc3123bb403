//! Invocation runtime
//!
//! Owns the common parameter set of one command invocation and resolves
//! every emission against it:
//! - error/warning/information: effective action preference + capture
//! - output: capture into `OutVariable`
//! - pipeline item: replace `PipelineVariable`, removed when the pipeline ends
//!
//! Once completed, further emissions are rejected with `InvocationCompleted`.
//! The invocation never halts on its own. It hands the effective preference
//! back to the caller, which decides whether to stop, prompt or continue.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::binding::{CaptureChannel, CaptureRecorder};
use crate::context::InvocationContext;
use crate::emission_log::{EmissionKind, EmissionLog};
use crate::error::ParamError;
use crate::params::CommonParameters;
use crate::preference::{ActionPreference, PreferenceChannel};
use crate::scope::VariableScope;

/// How an error/warning/information event was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub channel: PreferenceChannel,
    pub preference: ActionPreference,
    pub captured: bool,
}

impl Outcome {
    /// Whether the event still goes to its normal destination
    pub fn is_displayed(&self) -> bool {
        self.preference.is_displayed()
    }

    /// Whether the runtime should halt the invocation
    pub fn should_stop(&self) -> bool {
        self.preference == ActionPreference::Stop
    }
}

/// One command invocation's common-parameter state
pub struct Invocation {
    params: CommonParameters,
    context: InvocationContext,
    scope: Arc<dyn VariableScope>,
    recorder: CaptureRecorder,
    log: EmissionLog,
    pipeline_active: bool,
    completed: bool,
}

impl Invocation {
    /// Start an invocation; the context must carry a caller scope
    pub fn new(context: InvocationContext) -> Result<Self, ParamError> {
        let scope = context
            .scope()
            .cloned()
            .ok_or_else(|| ParamError::MissingContext {
                details: "invocation context has no caller scope".into(),
            })?;
        Ok(Self {
            params: CommonParameters::new(),
            context,
            scope,
            recorder: CaptureRecorder::new(),
            log: EmissionLog::new(),
            pipeline_active: false,
            completed: false,
        })
    }

    /// Start an invocation and bind its common arguments
    ///
    /// Any validation failure aborts before the command body would run.
    pub fn bind<'a, I>(context: InvocationContext, args: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut invocation = Self::new(context)?;
        invocation.bind_arguments(args)?;
        Ok(invocation)
    }

    /// Bind common arguments atomically
    #[instrument(skip_all)]
    pub fn bind_arguments<'a, I>(&mut self, args: I) -> Result<(), ParamError>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        self.params.bind_all(args, &self.context.legal)
    }

    pub fn parameters(&self) -> &CommonParameters {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut CommonParameters {
        &mut self.params
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    pub fn log(&self) -> &EmissionLog {
        &self.log
    }

    // ═══════════════════════════════════════════════════════════════
    // Preferences (read live at each emission)
    // ═══════════════════════════════════════════════════════════════

    pub fn action(&self, channel: PreferenceChannel) -> ActionPreference {
        self.params.preferences().action(channel, &self.context.ambient)
    }

    /// Change a channel's preference mid-invocation
    pub fn set_action(
        &mut self,
        channel: PreferenceChannel,
        preference: ActionPreference,
    ) -> Result<(), ParamError> {
        self.context.legal.check(channel, preference)?;
        self.params.preferences_mut().set_action(channel, preference);
        self.log.push(EmissionKind::PreferenceChanged {
            channel,
            preference,
        });
        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.params.preferences().verbose(&self.context.ambient)
    }

    pub fn debug(&self) -> bool {
        self.params.preferences().debug(&self.context.ambient)
    }

    // ═══════════════════════════════════════════════════════════════
    // Emissions
    // ═══════════════════════════════════════════════════════════════

    pub fn write_error(&mut self, record: Value) -> Result<Outcome, ParamError> {
        self.emit_event(PreferenceChannel::Error, CaptureChannel::Error, record)
    }

    pub fn write_warning(&mut self, record: Value) -> Result<Outcome, ParamError> {
        self.emit_event(PreferenceChannel::Warning, CaptureChannel::Warning, record)
    }

    pub fn write_information(&mut self, record: Value) -> Result<Outcome, ParamError> {
        self.emit_event(
            PreferenceChannel::Information,
            CaptureChannel::Information,
            record,
        )
    }

    /// Emit a success-output item; returns whether it was captured
    pub fn write_output(&mut self, item: Value) -> Result<bool, ParamError> {
        self.ensure_active("output")?;
        let captured = self.recorder.record(
            self.params.captures(),
            CaptureChannel::Output,
            &item,
            self.scope.as_ref(),
        )?;
        self.log.push(EmissionKind::Output { item, captured });
        Ok(captured)
    }

    /// Returns whether the message is shown
    pub fn write_verbose(&mut self, message: impl Into<String>) -> bool {
        let displayed = self.verbose();
        self.log.push(EmissionKind::Verbose {
            message: message.into(),
            displayed,
        });
        displayed
    }

    /// Returns whether the message is shown
    pub fn write_debug(&mut self, message: impl Into<String>) -> bool {
        let displayed = self.debug();
        self.log.push(EmissionKind::Debug {
            message: message.into(),
            displayed,
        });
        displayed
    }

    /// A pipeline item starts flowing through the invocation
    pub fn begin_pipeline_item(&mut self, item: Value) -> Result<(), ParamError> {
        self.ensure_active("pipeline item")?;
        self.recorder.record(
            self.params.captures(),
            CaptureChannel::Pipeline,
            &item,
            self.scope.as_ref(),
        )?;
        self.pipeline_active = true;
        self.log.push(EmissionKind::PipelineItem { item });
        Ok(())
    }

    /// The pipeline stopped streaming into this invocation
    ///
    /// The pipeline variable only exists while items flow, so it is removed.
    pub fn end_pipeline(&mut self) -> Result<(), ParamError> {
        if !self.pipeline_active {
            return Ok(());
        }
        self.recorder
            .clear_pipeline(self.params.captures(), self.scope.as_ref())?;
        self.pipeline_active = false;
        Ok(())
    }

    pub fn is_pipeline_active(&self) -> bool {
        self.pipeline_active
    }

    /// Finish the invocation and settle captures in the caller's scope
    ///
    /// Calling it again is a no-op.
    pub fn complete(&mut self) -> Result<(), ParamError> {
        if self.completed {
            return Ok(());
        }
        self.end_pipeline()?;
        self.recorder
            .finish(self.params.captures(), self.scope.as_ref())?;
        self.completed = true;
        self.log.push(EmissionKind::Completed);
        debug!(emissions = self.log.len(), "invocation completed");
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn emit_event(
        &mut self,
        channel: PreferenceChannel,
        capture: CaptureChannel,
        record: Value,
    ) -> Result<Outcome, ParamError> {
        self.ensure_active(match channel {
            PreferenceChannel::Error => "error",
            PreferenceChannel::Warning => "warning",
            PreferenceChannel::Information => "information",
        })?;
        let preference = self.action(channel);
        // Ignore discards the event entirely, capture included
        let captured = if preference == ActionPreference::Ignore {
            false
        } else {
            self.recorder.record(
                self.params.captures(),
                capture,
                &record,
                self.scope.as_ref(),
            )?
        };
        self.log.push(EmissionKind::Event {
            channel,
            item: record,
            preference,
            captured,
        });
        Ok(Outcome {
            channel,
            preference,
            captured,
        })
    }

    fn ensure_active(&self, emission: &'static str) -> Result<(), ParamError> {
        if self.completed {
            return Err(ParamError::InvocationCompleted { emission });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("params", &self.params)
            .field("context", &self.context)
            .field("pipeline_active", &self.pipeline_active)
            .field("completed", &self.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AmbientPreferences;
    use crate::scope::Scope;
    use serde_json::json;

    fn invocation(scope: &Scope) -> Invocation {
        Invocation::new(InvocationContext::new(Arc::new(scope.clone()))).unwrap()
    }

    #[test]
    fn missing_scope_is_contract_violation() {
        let err = Invocation::new(InvocationContext::default()).unwrap_err();
        assert!(matches!(err, ParamError::MissingContext { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn preference_changes_are_observed_live() {
        let scope = Scope::new();
        let mut inv = invocation(&scope);
        let first = inv.write_error(json!("e1")).unwrap();
        assert_eq!(first.preference, ActionPreference::Continue);

        inv.set_action(PreferenceChannel::Error, ActionPreference::Stop)
            .unwrap();
        let second = inv.write_error(json!("e2")).unwrap();
        assert!(second.should_stop());
    }

    #[test]
    fn set_action_respects_legal_set() {
        let scope = Scope::new();
        let mut inv = invocation(&scope);
        assert!(inv
            .set_action(PreferenceChannel::Information, ActionPreference::Suspend)
            .is_err());
        assert_eq!(
            inv.action(PreferenceChannel::Information),
            ActionPreference::SilentlyContinue
        );
    }

    #[test]
    fn ambient_defaults_come_from_context() {
        let scope = Scope::new();
        let ambient = AmbientPreferences {
            warning_action: ActionPreference::Stop,
            debug: true,
            ..AmbientPreferences::default()
        };
        let ctx = InvocationContext::new(Arc::new(scope)).with_ambient(ambient);
        let mut inv = Invocation::new(ctx).unwrap();
        assert_eq!(inv.action(PreferenceChannel::Warning), ActionPreference::Stop);
        assert!(inv.write_debug("shown"));
        assert!(!inv.write_verbose("hidden"));
    }

    #[test]
    fn ignore_skips_capture() {
        let scope = Scope::new();
        let ea = json!("Ignore");
        let ev = json!("errs");
        let mut inv = Invocation::new(InvocationContext::new(Arc::new(scope.clone())))
            .unwrap();
        inv.bind_arguments([("ErrorAction", &ea), ("ErrorVariable", &ev)])
            .unwrap();
        let outcome = inv.write_error(json!("e")).unwrap();
        assert!(!outcome.captured);
        assert!(!outcome.is_displayed());
        inv.complete().unwrap();
        assert_eq!(scope.read_variable("errs"), Some(json!([])));
    }

    #[test]
    fn silently_continue_still_captures() {
        let scope = Scope::new();
        let ea = json!("SilentlyContinue");
        let ev = json!("errs");
        let mut inv = Invocation::bind(
            InvocationContext::new(Arc::new(scope.clone())),
            [("ea", &ea), ("ev", &ev)],
        )
        .unwrap();
        let outcome = inv.write_error(json!("e")).unwrap();
        assert!(outcome.captured);
        assert!(!outcome.is_displayed());
        assert_eq!(scope.read_variable("errs"), Some(json!(["e"])));
    }

    #[test]
    fn pipeline_lifecycle() {
        let scope = Scope::new();
        let pv = json!("p");
        let mut inv = Invocation::bind(
            InvocationContext::new(Arc::new(scope.clone())),
            [("PipelineVariable", &pv)],
        )
        .unwrap();
        assert!(!inv.is_pipeline_active());
        inv.begin_pipeline_item(json!(1)).unwrap();
        inv.begin_pipeline_item(json!(2)).unwrap();
        assert!(inv.is_pipeline_active());
        assert_eq!(scope.read_variable("p"), Some(json!(2)));
        inv.end_pipeline().unwrap();
        assert!(!inv.is_pipeline_active());
        assert_eq!(scope.read_variable("p"), None);
    }

    #[test]
    fn complete_removes_streaming_pipeline_variable() {
        let scope = Scope::new();
        let pv = json!("p");
        let mut inv = Invocation::bind(
            InvocationContext::new(Arc::new(scope.clone())),
            [("pv", &pv)],
        )
        .unwrap();
        inv.begin_pipeline_item(json!(1)).unwrap();
        inv.complete().unwrap();
        assert_eq!(scope.read_variable("p"), None);
    }

    #[test]
    fn emissions_after_complete_are_rejected() {
        let scope = Scope::new();
        let ev = json!("x");
        let ov = json!("o");
        let mut inv = Invocation::bind(
            InvocationContext::new(Arc::new(scope.clone())),
            [("ev", &ev), ("ov", &ov)],
        )
        .unwrap();
        inv.complete().unwrap();

        assert!(matches!(
            inv.write_error(json!("late")),
            Err(ParamError::InvocationCompleted { emission: "error" })
        ));
        assert!(inv.write_warning(json!("late")).is_err());
        assert!(inv.write_output(json!("late")).is_err());
        assert!(inv.begin_pipeline_item(json!("late")).is_err());
        assert_eq!(scope.read_variable("x"), Some(json!([])));
        assert_eq!(scope.read_variable("o"), Some(json!([])));
    }

    #[test]
    fn complete_is_idempotent() {
        let scope = Scope::new();
        let mut inv = invocation(&scope);
        inv.complete().unwrap();
        inv.complete().unwrap();
        assert!(inv.is_completed());
        let completions = inv
            .log()
            .entries()
            .iter()
            .filter(|e| e.kind == EmissionKind::Completed)
            .count();
        assert_eq!(completions, 1);
    }
}
