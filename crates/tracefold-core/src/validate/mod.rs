//! Two-pass validation.
//!
//! `parse_*` functions take raw JSON, run a shape pass that reports the path
//! of the first offending field, deserialize, then run the invariant pass on
//! the typed value. `validate_*` functions run only the checks a typed value
//! can still fail.

pub mod context;
pub mod envelope;
pub mod event;
pub(crate) mod shape;

pub use context::{
    parse_absorption_request, parse_context_document, parse_loop_turn,
    validate_absorption_request, validate_absorption_result, validate_context_document,
};
pub use envelope::{
    check_result_invariant, parse_application_call, parse_application_response,
    parse_kernel_run_request, parse_kernel_run_result, validate_application_call,
    validate_kernel_run_result,
};
pub use event::{check_epistemic_policy, parse_trace_event, validate_trace_event};
