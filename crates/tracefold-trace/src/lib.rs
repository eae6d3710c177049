pub mod absorb;
pub mod context;
pub mod error;
pub mod projector;

pub use absorb::absorb;
pub use context::{
    fact_from_event, facts_from_events, label_for_kind, provenance_for_event, ContextBuilder,
};
pub use error::TraceError;
pub use projector::{
    project, project_application_call, project_kernel_run, APPLICATION_CALL_KIND, KERNEL_RUN_KIND,
};
