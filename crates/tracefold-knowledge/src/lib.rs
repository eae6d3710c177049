//! Scores how much new or upgraded knowledge one computation pass produced.

pub mod delta;

pub use delta::{
    compute_knowledge_delta, compute_knowledge_delta_weighted, delta_trace_event,
    KNOWLEDGE_DELTA_KIND,
};
