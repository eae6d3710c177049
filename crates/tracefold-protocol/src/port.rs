use tracefold_core::model::{KernelRunRequest, KernelRunResult};

use crate::error::ProtocolError;

/// The single boundary to the external computation engine.
///
/// In-process, subprocess and remote adapters all look the same from here.
/// Retries and timeouts belong to the adapter, not to callers of `run`.
#[async_trait::async_trait]
pub trait KernelPort: Send + Sync {
    async fn run(&self, request: KernelRunRequest) -> Result<KernelRunResult, ProtocolError>;
}

/// In-process adapter around a plain function.
pub struct FnKernelPort<F> {
    handler: F,
}

impl<F> FnKernelPort<F>
where
    F: Fn(KernelRunRequest) -> KernelRunResult + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait::async_trait]
impl<F> KernelPort for FnKernelPort<F>
where
    F: Fn(KernelRunRequest) -> KernelRunResult + Send + Sync,
{
    async fn run(&self, request: KernelRunRequest) -> Result<KernelRunResult, ProtocolError> {
        Ok((self.handler)(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracefold_core::model::{ErrorPayload, ModelRef};

    #[tokio::test]
    async fn test_fn_port_runs_handler() {
        let port = FnKernelPort::new(|req: KernelRunRequest| {
            if req.model.id == "engine.echo.run" {
                KernelRunResult::success(req.input)
            } else {
                KernelRunResult::failure(ErrorPayload::new("unknown model").with_code("NOT_FOUND"))
            }
        });

        let ok = port
            .run(KernelRunRequest {
                model: ModelRef::new("engine.echo.run"),
                input: json!({"x": 1}),
                params: None,
            })
            .await
            .unwrap();
        assert_eq!(ok.output, Some(json!({"x": 1})));

        let failed = port
            .run(KernelRunRequest {
                model: ModelRef::new("engine.other.run"),
                input: json!(null),
                params: None,
            })
            .await
            .unwrap();
        assert!(!failed.ok);
    }

    #[tokio::test]
    async fn test_port_as_trait_object() {
        let port: Box<dyn KernelPort> =
            Box::new(FnKernelPort::new(|_| KernelRunResult::success(json!(true))));
        let result = port
            .run(KernelRunRequest {
                model: ModelRef::new("m"),
                input: json!(null),
                params: None,
            })
            .await
            .unwrap();
        assert!(result.ok);
    }
}
