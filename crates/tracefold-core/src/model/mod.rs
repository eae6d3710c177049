pub mod absorption;
pub mod call;
pub mod context;
pub mod event;
pub mod knowledge;
pub mod result;
pub mod turn;

pub use absorption::{AbsorptionRequest, AbsorptionResult, AbsorptionStrategy, ContextStamp};
pub use call::{ApplicationCall, FormKind, KernelRunRequest, ModelRef, User};
pub use context::{ContextDocument, Fact, Goal, Provenance, SchemaDescriptor};
pub use event::{EpistemicLevel, EventMeta, EventRole, FactStoreMeta, FactStoreOp, TraceEvent};
pub use knowledge::{
    DeltaDetails, DeltaWeights, ItemProvenance, KnowledgeDelta, KnowledgeItem, KnowledgeSnapshot,
    Modality, ModalityKind,
};
pub use result::{
    ApplicationEnvelope, ApplicationError, ApplicationResponse, ErrorPayload, KernelOutcome,
    KernelRunResult,
};
pub use turn::{LoopMeta, LoopTurn};

/// Free-form JSON object used for open metadata channels.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
