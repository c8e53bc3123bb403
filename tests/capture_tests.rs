//! # Capture and preference integration tests
//!
//! Exercises an invocation end to end through the public API:
//! 1. Replace vs append capture on the list channels
//! 2. Pipeline variable holding only the latest item while streaming
//! 3. Eager, all-or-nothing validation of capture targets
//! 4. Ambient fallback and live preference changes
//! 5. Commit across an async boundary

use std::sync::Arc;

use common_params::{
    ActionPreference, AmbientPreferences, CaptureChannel, Invocation, InvocationContext,
    ParamError, PreferenceChannel, Scope, VariableScope,
};
use serde_json::{json, Value};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn context(scope: &Scope) -> InvocationContext {
    InvocationContext::new(Arc::new(scope.clone()))
}

fn bind(scope: &Scope, args: &[(&str, Value)]) -> Result<Invocation, ParamError> {
    Invocation::bind(context(scope), args.iter().map(|(n, v)| (*n, v)))
}

const CAPTURE_PARAMS: [&str; 5] = [
    "ErrorVariable",
    "WarningVariable",
    "InformationVariable",
    "OutVariable",
    "PipelineVariable",
];

// ============================================================================
// LIST CAPTURE
// ============================================================================

#[test]
fn replace_mode_errors_replace_prior_content() {
    let scope = Scope::with_variables([("x", json!(["prior", "content"]))]);
    let mut inv = bind(&scope, &[("ErrorVariable", json!("x"))]).unwrap();

    inv.write_error(json!("E1")).unwrap();
    inv.write_error(json!("E2")).unwrap();
    inv.complete().unwrap();

    assert_eq!(scope.read_variable("x"), Some(json!(["E1", "E2"])));
}

#[test]
fn append_mode_extends_prior_content() {
    let scope = Scope::with_variables([("x", json!(["A"]))]);
    let mut inv = bind(&scope, &[("ErrorVariable", json!("+x"))]).unwrap();

    inv.write_error(json!("E")).unwrap();
    inv.complete().unwrap();

    assert_eq!(scope.read_variable("x"), Some(json!(["A", "E"])));
}

#[test]
fn every_list_channel_captures() {
    let scope = Scope::new();
    let mut inv = bind(
        &scope,
        &[
            ("ev", json!("e")),
            ("wv", json!("w")),
            ("iv", json!("i")),
            ("ov", json!("o")),
        ],
    )
    .unwrap();

    assert!(inv.write_error(json!("err")).unwrap().captured);
    assert!(inv.write_warning(json!("warn")).unwrap().captured);
    assert!(inv.write_information(json!("info")).unwrap().captured);
    assert!(inv.write_output(json!(42)).unwrap());
    inv.complete().unwrap();

    assert_eq!(scope.read_variable("e"), Some(json!(["err"])));
    assert_eq!(scope.read_variable("w"), Some(json!(["warn"])));
    assert_eq!(scope.read_variable("i"), Some(json!(["info"])));
    assert_eq!(scope.read_variable("o"), Some(json!([42])));
}

#[test]
fn unbound_channels_leave_scope_alone() {
    let scope = Scope::with_variables([("untouched", json!(1))]);
    let mut inv = bind(&scope, &[]).unwrap();

    let outcome = inv.write_error(json!("e")).unwrap();
    assert!(!outcome.captured);
    assert!(!inv.write_output(json!("o")).unwrap());
    inv.complete().unwrap();

    assert_eq!(scope.len(), 1);
    assert_eq!(scope.read_variable("untouched"), Some(json!(1)));
}

#[test]
fn captures_are_visible_before_completion() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("OutVariable", json!("o"))]).unwrap();
    inv.write_output(json!(1)).unwrap();

    // Dropped without completing, as a cancelled invocation would be
    drop(inv);
    assert_eq!(scope.read_variable("o"), Some(json!([1])));
}

// ============================================================================
// PIPELINE VARIABLE
// ============================================================================

#[test]
fn pipeline_variable_is_latest_item_only() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("PipelineVariable", json!("p"))]).unwrap();

    for item in [json!("a"), json!(["b"]), json!({"c": 3})] {
        inv.begin_pipeline_item(item.clone()).unwrap();
        assert_eq!(scope.read_variable("p"), Some(item));
    }
    inv.end_pipeline().unwrap();
    assert_eq!(scope.read_variable("p"), None);
    inv.complete().unwrap();
    assert_eq!(scope.read_variable("p"), None);
}

#[test]
fn pipeline_variable_is_removed_on_completion() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("pv", json!("p"))]).unwrap();
    inv.begin_pipeline_item(json!(1)).unwrap();
    assert_eq!(scope.read_variable("p"), Some(json!(1)));
    inv.complete().unwrap();
    assert_eq!(scope.read_variable("p"), None);
}

#[test]
fn completed_invocation_leaves_captures_settled() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("ErrorVariable", json!("x"))]).unwrap();
    inv.complete().unwrap();

    let err = inv.write_error(json!("late")).unwrap_err();
    assert!(matches!(err, ParamError::InvocationCompleted { .. }));
    assert_eq!(scope.read_variable("x"), Some(json!([])));
}

#[test]
fn append_prefix_on_pipeline_variable_still_replaces() {
    let scope = Scope::with_variables([("p", json!("old"))]);
    let mut inv = bind(&scope, &[("pv", json!("+p"))]).unwrap();
    inv.begin_pipeline_item(json!(1)).unwrap();
    inv.begin_pipeline_item(json!(2)).unwrap();
    assert_eq!(scope.read_variable("p"), Some(json!(2)));
}

#[test]
fn long_output_stream_is_captured_in_order() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("ov", json!("o"))]).unwrap();
    for i in 0..20_000 {
        inv.write_output(json!(i)).unwrap();
    }
    inv.complete().unwrap();
    let stored = scope.read_variable("o").unwrap();
    let items = stored.as_array().unwrap();
    assert_eq!(items.len(), 20_000);
    assert_eq!(items.last(), Some(&json!(19_999)));
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn invalid_names_fail_on_every_capture_parameter() {
    for bad in ["", "a.b", "env:PATH", "$x", "a[0]", "x y", "(1+1)"] {
        for param in CAPTURE_PARAMS {
            for raw in [bad.to_string(), format!("+{bad}")] {
                let scope = Scope::new();
                let err = bind(&scope, &[(param, json!(raw))]).unwrap_err();
                match err {
                    ParamError::InvalidVariableName { parameter, value } => {
                        assert_eq!(parameter, param);
                        assert_eq!(value, raw);
                    }
                    other => panic!("{param}={raw}: unexpected error {other}"),
                }
            }
        }
    }
}

#[test]
fn failed_rebind_keeps_previous_binding() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("ErrorVariable", json!("good"))]).unwrap();
    let bad = json!("bad.name");
    assert!(inv.bind_arguments([("ErrorVariable", &bad)]).is_err());

    let binding = inv
        .parameters()
        .captures()
        .get(CaptureChannel::Error)
        .unwrap();
    assert_eq!(binding.target_name, "good");
}

#[test]
fn validation_failure_binds_nothing() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[]).unwrap();
    let ov = json!("fine");
    let ea = json!("Stop");
    let ob = json!(-1);
    assert!(inv
        .bind_arguments([("ov", &ov), ("ea", &ea), ("ob", &ob)])
        .is_err());

    assert!(inv.parameters().captures().is_empty());
    assert_eq!(inv.parameters().out_buffer(), None);
    assert_eq!(
        inv.parameters().preferences().explicit(PreferenceChannel::Error),
        None
    );
}

#[test]
fn out_buffer_accepts_zero_and_up() {
    let scope = Scope::new();
    for ok in [0, 1, 4096] {
        let inv = bind(&scope, &[("OutBuffer", json!(ok))]).unwrap();
        assert_eq!(inv.parameters().out_buffer(), Some(ok));
    }
    for bad in [-1, -4096] {
        assert!(matches!(
            bind(&scope, &[("OutBuffer", json!(bad))]),
            Err(ParamError::NegativeOutBuffer { .. })
        ));
    }
}

// ============================================================================
// PREFERENCES
// ============================================================================

#[test]
fn unset_preferences_follow_the_context() {
    let scope = Scope::new();
    for ambient in [
        AmbientPreferences::default(),
        AmbientPreferences {
            error_action: ActionPreference::Stop,
            warning_action: ActionPreference::SilentlyContinue,
            information_action: ActionPreference::Continue,
            verbose: true,
            debug: true,
        },
    ] {
        let inv = Invocation::new(context(&scope).with_ambient(ambient.clone())).unwrap();
        for channel in PreferenceChannel::ALL {
            assert_eq!(inv.action(channel), ambient.preference(channel));
        }
        assert_eq!(inv.verbose(), ambient.verbose);
        assert_eq!(inv.debug(), ambient.debug);
    }
}

#[test]
fn explicit_preferences_override_context() {
    let scope = Scope::new();
    let ambient = AmbientPreferences {
        warning_action: ActionPreference::Stop,
        ..AmbientPreferences::default()
    };
    let wa = json!("continue");
    let vb = json!(true);
    let inv = Invocation::bind(
        context(&scope).with_ambient(ambient),
        [("wa", &wa), ("vb", &vb)],
    )
    .unwrap();
    assert_eq!(inv.action(PreferenceChannel::Warning), ActionPreference::Continue);
    assert!(inv.verbose());
}

#[test]
fn later_preference_change_applies_to_later_events() {
    let scope = Scope::new();
    let mut inv = bind(&scope, &[("WarningAction", json!("Continue"))]).unwrap();
    assert!(!inv.write_warning(json!("w1")).unwrap().should_stop());
    inv.set_action(PreferenceChannel::Warning, ActionPreference::Stop)
        .unwrap();
    assert!(inv.write_warning(json!("w2")).unwrap().should_stop());
}

// ============================================================================
// ASYNC BOUNDARY
// ============================================================================

#[tokio::test]
async fn commit_after_async_boundary() {
    let scope = Scope::with_variables([("errs", json!(["A"]))]);
    let inv = bind(&scope, &[("ErrorVariable", json!("+errs"))]).unwrap();

    let handle = tokio::spawn(async move {
        let mut inv = inv;
        inv.write_error(json!("remote")).unwrap();
        inv.complete()
    });
    handle.await.unwrap().unwrap();

    assert_eq!(scope.read_variable("errs"), Some(json!(["A", "remote"])));
}

#[tokio::test]
async fn torn_down_scope_surfaces_scope_closed() {
    let scope = Scope::new();
    let inv = bind(&scope, &[("OutVariable", json!("o"))]).unwrap();
    scope.close();

    let result = tokio::spawn(async move {
        let mut inv = inv;
        inv.write_output(json!(1))
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(ParamError::ScopeClosed { .. })));
}
