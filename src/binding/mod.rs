//! Binding Module - capture of channel items into caller variables
//!
//! - `validate`: variable name grammar
//! - `capture`: per-channel targets (`ErrorVariable`, `+errs`, ...)
//! - `recorder`: runtime commit of emitted items
//!
//! Data flow:
//! ```text
//! raw value ("+errs") → VariableReference { errs, append }
//!                              ↓
//!                       CaptureBindings (per channel)
//!                              ↓
//!              emitted item → CaptureRecorder → scope variable
//! ```

mod capture;
mod recorder;
mod validate;

pub use capture::{CaptureBindings, CaptureChannel, VariableReference, APPEND_PREFIX};
pub use recorder::CaptureRecorder;
pub use validate::{is_valid_variable_name, validate_variable_name};
