pub mod batch;
pub mod bridge;
pub mod error;
pub mod ids;
pub mod port;
pub mod syscall;

pub use batch::{decode_batch, encode_batch};
pub use bridge::{
    application_call_to_kernel_request, call_from_request, invoke_application_call,
    APPLICATION_MODEL_KIND,
};
pub use error::ProtocolError;
pub use ids::{operation_id, OperationId};
pub use port::{FnKernelPort, KernelPort};
pub use syscall::{Syscall, SyscallTable};
