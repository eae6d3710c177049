use anyhow::Result;
use clap::{Args, ValueEnum};
use schemars::{schema_for, Schema};

use tracefold_core::model::{
    AbsorptionRequest, AbsorptionResult, ApplicationCall, ApplicationEnvelope, ContextDocument,
    KernelRunRequest, KernelRunResult, KnowledgeDelta, KnowledgeSnapshot, LoopTurn, TraceEvent,
};
use tracefold_protocol::SyscallTable;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Contract {
    Event,
    Request,
    Result,
    Call,
    Response,
    Context,
    AbsorptionRequest,
    AbsorptionResult,
    LoopTurn,
    Snapshot,
    Delta,
    Syscalls,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Contract to describe
    #[arg(value_enum)]
    pub contract: Contract,
}

fn schema(contract: Contract) -> Schema {
    match contract {
        Contract::Event => schema_for!(TraceEvent),
        Contract::Request => schema_for!(KernelRunRequest),
        Contract::Result => schema_for!(KernelRunResult),
        Contract::Call => schema_for!(ApplicationCall),
        Contract::Response => schema_for!(ApplicationEnvelope),
        Contract::Context => schema_for!(ContextDocument),
        Contract::AbsorptionRequest => schema_for!(AbsorptionRequest),
        Contract::AbsorptionResult => schema_for!(AbsorptionResult),
        Contract::LoopTurn => schema_for!(LoopTurn),
        Contract::Snapshot => schema_for!(KnowledgeSnapshot),
        Contract::Delta => schema_for!(KnowledgeDelta),
        Contract::Syscalls => schema_for!(SyscallTable),
    }
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&schema(args.contract))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_schema_requires_kind() {
        let value = serde_json::to_value(schema(Contract::Event)).unwrap();
        let required = value["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "kind"));
    }

    #[test]
    fn test_every_contract_has_a_schema() {
        for contract in Contract::value_variants() {
            let value = serde_json::to_value(schema(*contract)).unwrap();
            assert!(value.is_object(), "{contract:?}");
        }
    }
}
