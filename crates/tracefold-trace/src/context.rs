use chrono::{DateTime, Utc};
use tracing::debug;

use tracefold_core::model::{ContextDocument, Fact, Goal, Provenance, SchemaDescriptor, TraceEvent};

use crate::projector::{REQUEST_SUFFIX, RESULT_SUFFIX};

/// Event kind with its trailing verb removed, so `a.b.request` and
/// `a.b.result` share the label `a.b`. An undotted kind is its own label.
pub fn label_for_kind(kind: &str) -> &str {
    match kind.rsplit_once('.') {
        Some((head, _)) if !head.is_empty() => head,
        _ => kind,
    }
}

/// Requests are observed and results inferred. Other kinds are inferred only
/// when the kernel emitted them.
pub fn provenance_for_event(event: &TraceEvent) -> Provenance {
    if event.kind.ends_with(REQUEST_SUFFIX) {
        Provenance::Observed
    } else if event.kind.ends_with(RESULT_SUFFIX) || event.is_kernel_sourced() {
        Provenance::Inferred
    } else {
        Provenance::Observed
    }
}

pub fn fact_from_event(event: &TraceEvent) -> Fact {
    Fact {
        fact_type: event.kind.clone(),
        label: label_for_kind(&event.kind).to_string(),
        provenance: provenance_for_event(event),
        data: event.payload.clone(),
    }
}

/// One fact per event, in event order.
pub fn facts_from_events(events: &[TraceEvent]) -> Vec<Fact> {
    events.iter().map(fact_from_event).collect()
}

/// Folds an ordered trace into a [`ContextDocument`].
pub struct ContextBuilder {
    id: String,
    timestamp: DateTime<Utc>,
    schema: SchemaDescriptor,
    goal: Option<Goal>,
}

impl ContextBuilder {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, schema: SchemaDescriptor) -> Self {
        Self {
            id: id.into(),
            timestamp,
            schema,
            goal: None,
        }
    }

    pub fn goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn build(self, events: &[TraceEvent]) -> ContextDocument {
        let facts = facts_from_events(events);
        debug!(context = %self.id, facts = facts.len(), "built context from trace");
        ContextDocument {
            id: self.id,
            timestamp: self.timestamp,
            facts,
            schema: self.schema,
            goal: self.goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracefold_core::model::{EventMeta, EventRole};

    #[test]
    fn test_labels() {
        assert_eq!(label_for_kind("kernel.run.request"), "kernel.run");
        assert_eq!(label_for_kind("kernel.run.result"), "kernel.run");
        assert_eq!(label_for_kind("entity.assert"), "entity");
        assert_eq!(label_for_kind("heartbeat"), "heartbeat");
        assert_eq!(label_for_kind(".odd"), ".odd");
    }

    #[test]
    fn test_provenance() {
        let kernel = EventMeta {
            role: Some(EventRole::Kernel),
            ..Default::default()
        };
        assert_eq!(
            provenance_for_event(&TraceEvent::new("a.request", json!(null))),
            Provenance::Observed
        );
        assert_eq!(
            provenance_for_event(&TraceEvent::new("a.result", json!(null))),
            Provenance::Inferred
        );
        assert_eq!(
            provenance_for_event(&TraceEvent::new("entity.assert", json!(null))),
            Provenance::Observed
        );
        assert_eq!(
            provenance_for_event(&TraceEvent::new("entity.assert", json!(null)).with_meta(kernel.clone())),
            Provenance::Inferred
        );
        // The suffix wins over the role.
        assert_eq!(
            provenance_for_event(&TraceEvent::new("a.request", json!(null)).with_meta(kernel)),
            Provenance::Observed
        );
    }

    #[test]
    fn test_builder_preserves_order_and_payload() {
        let events = vec![
            TraceEvent::new("shape.create", json!({"id": "shape-1"})),
            TraceEvent::new("kernel.run.request", json!({"model": {"id": "m"}})),
            TraceEvent::new("kernel.run.result", json!({"ok": false, "error": {"message": "x"}})),
        ];
        let ctx = ContextBuilder::new("ctx-1", Utc::now(), SchemaDescriptor::new("trace:demo"))
            .goal(Goal {
                id: "g".into(),
                goal_type: "demo".into(),
                description: "d".into(),
            })
            .build(&events);

        let types: Vec<_> = ctx.facts.iter().map(|f| f.fact_type.as_str()).collect();
        assert_eq!(types, ["shape.create", "kernel.run.request", "kernel.run.result"]);
        assert_eq!(ctx.facts[2].data["error"]["message"], "x");
        assert_eq!(ctx.facts[2].provenance, Provenance::Inferred);
        assert_eq!(ctx.facts_with_label("kernel.run").count(), 2);
        assert_eq!(ctx.goal.unwrap().id, "g");
    }

    #[test]
    fn test_empty_trace() {
        let ctx = ContextBuilder::new("c", Utc::now(), SchemaDescriptor::new("s")).build(&[]);
        assert!(ctx.facts.is_empty());
    }
}
