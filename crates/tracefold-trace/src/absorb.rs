use std::collections::HashSet;

use serde_json::json;
use tracing::{debug, warn};

use tracefold_core::model::{
    AbsorptionRequest, AbsorptionResult, AbsorptionStrategy, ContextDocument, ContextStamp, Fact,
    JsonMap,
};
use tracefold_core::validate::validate_absorption_result;

use crate::context::facts_from_events;
use crate::error::TraceError;

/// Fold `request.trace_delta` into the next context.
///
/// `append` keeps the previous facts and adds one fact per event; `recompute`
/// rebuilds from the delta alone and drops exact duplicates. Either way the
/// oldest facts go first when `maxFacts` is exceeded. The result is checked
/// against the absorption contract before it is returned.
pub fn absorb(
    request: &AbsorptionRequest,
    stamp: ContextStamp,
) -> Result<AbsorptionResult, TraceError> {
    let strategy = request.effective_strategy();
    let derived = facts_from_events(&request.trace_delta);

    let mut facts = match strategy {
        AbsorptionStrategy::Append => {
            let mut facts = request.previous.facts.clone();
            facts.extend(derived);
            facts
        }
        AbsorptionStrategy::Recompute => dedupe(derived),
    };
    let dropped = truncate_oldest(&mut facts, request.max_facts);

    let absorbed_count = match strategy {
        AbsorptionStrategy::Append => request.trace_delta.len(),
        AbsorptionStrategy::Recompute => facts.len(),
    };

    let next = ContextDocument {
        id: stamp.id,
        timestamp: stamp.timestamp,
        facts,
        schema: stamp
            .schema
            .unwrap_or_else(|| request.previous.schema.clone()),
        goal: request.previous.goal.clone(),
    };

    let mut meta = request.meta.clone().unwrap_or_else(JsonMap::new);
    meta.insert("strategy".into(), json!(strategy.as_str()));
    meta.insert("droppedFacts".into(), json!(dropped));

    let result = AbsorptionResult {
        next,
        absorbed_count,
        meta: Some(meta),
    };
    validate_absorption_result(&result, request)?;

    debug!(
        previous = %request.previous.id,
        next = %result.next.id,
        strategy = strategy.as_str(),
        absorbed = absorbed_count,
        facts = result.next.facts.len(),
        "absorbed trace delta"
    );
    Ok(result)
}

/// Keep the first occurrence of every fact. Payloads compare by their
/// serialized form, which is stable because object keys are kept sorted.
fn dedupe(facts: Vec<Fact>) -> Vec<Fact> {
    let mut seen = HashSet::with_capacity(facts.len());
    facts
        .into_iter()
        .filter(|fact| {
            seen.insert((
                fact.fact_type.clone(),
                fact.label.clone(),
                fact.provenance,
                fact.data.to_string(),
            ))
        })
        .collect()
}

fn truncate_oldest(facts: &mut Vec<Fact>, max_facts: Option<usize>) -> usize {
    let Some(max) = max_facts else {
        return 0;
    };
    if facts.len() <= max {
        return 0;
    }
    let excess = facts.len() - max;
    facts.drain(..excess);
    warn!(dropped = excess, max_facts = max, "fact cap reached, dropping oldest facts");
    excess
}
