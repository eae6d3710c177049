//! Fluent loop session over a [`KernelPort`].
//!
//! # Example
//! ```no_run
//! use chrono::Utc;
//! use serde_json::json;
//! use tracefold_sdk::{
//!     ContextDocument, FnKernelPort, KernelRunRequest, KernelRunResult, LoopSession, ModelRef,
//!     SchemaDescriptor,
//! };
//!
//! # async fn demo() -> Result<(), tracefold_sdk::SdkError> {
//! let port = FnKernelPort::new(|req: KernelRunRequest| KernelRunResult::success(req.input));
//! let context = ContextDocument::empty("ctx-0", Utc::now(), SchemaDescriptor::new("trace:demo"));
//! let mut session = LoopSession::begin(port, context);
//!
//! session
//!     .run_kernel(KernelRunRequest {
//!         model: ModelRef::new("engine.pregel.rank"),
//!         input: json!({"graph": "g://demo"}),
//!         params: None,
//!     })
//!     .await?;
//! let result = session.absorb_now()?;
//! println!("{} facts", result.next.facts.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::SdkError;
pub use session::LoopSession;

pub use tracefold_core::model::{
    AbsorptionResult, ApplicationCall, ApplicationResponse, ContextDocument, ContextStamp,
    KernelRunRequest, KernelRunResult, KnowledgeDelta, KnowledgeSnapshot, LoopTurn, ModelRef,
    SchemaDescriptor, TraceEvent, User,
};
pub use tracefold_core::TracefoldConfig;
pub use tracefold_protocol::{FnKernelPort, KernelPort};
