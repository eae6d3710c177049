use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Core error: {0}")]
    Core(#[from] tracefold_core::CoreError),

    #[error("Trace error: {0}")]
    Trace(#[from] tracefold_trace::TraceError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] tracefold_protocol::ProtocolError),
}
