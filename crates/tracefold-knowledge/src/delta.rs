use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use tracing::debug;

use tracefold_core::model::{
    DeltaDetails, DeltaWeights, EventMeta, EventRole, KnowledgeDelta, KnowledgeItem,
    KnowledgeSnapshot, TraceEvent,
};

pub const KNOWLEDGE_DELTA_KIND: &str = "knowledge.delta";

/// Id to "is any occurrence `actual`". Duplicate ids collapse.
fn index_actual(items: &[KnowledgeItem]) -> BTreeMap<&str, bool> {
    let mut index = BTreeMap::new();
    for item in items {
        let actual = index.entry(item.id.as_str()).or_insert(false);
        *actual |= item.is_actual();
    }
    index
}

fn ids(items: &[KnowledgeItem]) -> BTreeSet<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

pub fn compute_knowledge_delta(
    before: &KnowledgeSnapshot,
    after: &KnowledgeSnapshot,
) -> KnowledgeDelta {
    compute_knowledge_delta_weighted(before, after, &DeltaWeights::default())
}

/// Compare two snapshots by id.
///
/// A relation is new when its id is absent before. It is upgraded when it was
/// present but not `actual` before and is `actual` after. A property is new
/// when its id is absent before. Only id membership and modality transitions
/// matter, so array order never changes the result; id lists come out sorted.
pub fn compute_knowledge_delta_weighted(
    before: &KnowledgeSnapshot,
    after: &KnowledgeSnapshot,
    weights: &DeltaWeights,
) -> KnowledgeDelta {
    let before_relations = index_actual(&before.relations);
    let before_properties = ids(&before.properties);

    let mut details = DeltaDetails::default();
    for (id, after_actual) in index_actual(&after.relations) {
        match before_relations.get(id).copied() {
            None => details.new_relation_ids.push(id.to_string()),
            Some(false) if after_actual => details.upgraded_relation_ids.push(id.to_string()),
            Some(_) => {}
        }
    }
    for id in ids(&after.properties) {
        if !before_properties.contains(id) {
            details.new_property_ids.push(id.to_string());
        }
    }

    let new_relations = details.new_relation_ids.len();
    let new_properties = details.new_property_ids.len();
    let modality_upgrades = details.upgraded_relation_ids.len();
    let score = new_relations as f64 * weights.relation
        + new_properties as f64 * weights.property
        + modality_upgrades as f64 * weights.upgrade;

    debug!(
        new_relations,
        new_properties,
        modality_upgrades,
        score,
        "computed knowledge delta"
    );

    KnowledgeDelta {
        new_relations,
        new_properties,
        modality_upgrades,
        score,
        details,
    }
}

/// A `knowledge.delta` event for re-absorption, or `None` when the pass
/// produced nothing worth recording.
pub fn delta_trace_event(delta: &KnowledgeDelta) -> Option<TraceEvent> {
    if delta.score <= 0.0 {
        return None;
    }
    let payload = json!({
        "newRelations": delta.new_relations,
        "newProperties": delta.new_properties,
        "modalityUpgrades": delta.modality_upgrades,
        "score": delta.score,
        "details": {
            "newRelationIds": delta.details.new_relation_ids,
            "newPropertyIds": delta.details.new_property_ids,
            "upgradedRelationIds": delta.details.upgraded_relation_ids,
        }
    });
    Some(
        TraceEvent::new(KNOWLEDGE_DELTA_KIND, payload).with_meta(EventMeta {
            role: Some(EventRole::Kernel),
            ..Default::default()
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracefold_core::model::ModalityKind;

    const EPS: f64 = 1e-9;

    fn snapshot(value: serde_json::Value) -> KnowledgeSnapshot {
        serde_json::from_value(value).unwrap()
    }

    fn example() -> (KnowledgeSnapshot, KnowledgeSnapshot) {
        let before = snapshot(json!({
            "relations": [{"id": "r1", "provenance": {"modality": {"kind": "possible"}}}],
            "properties": []
        }));
        let after = snapshot(json!({
            "relations": [
                {"id": "r1", "provenance": {"modality": {"kind": "actual"}}},
                {"id": "r2"}
            ],
            "properties": [{"id": "p1"}]
        }));
        (before, after)
    }

    #[test]
    fn test_worked_example() {
        let (before, after) = example();
        let delta = compute_knowledge_delta(&before, &after);
        assert_eq!(delta.new_relations, 1);
        assert_eq!(delta.new_properties, 1);
        assert_eq!(delta.modality_upgrades, 1);
        assert!((delta.score - 3.5).abs() < EPS);
        assert_eq!(delta.details.new_relation_ids, vec!["r2"]);
        assert_eq!(delta.details.new_property_ids, vec!["p1"]);
        assert_eq!(delta.details.upgraded_relation_ids, vec!["r1"]);
    }

    #[test]
    fn test_identical_snapshots_score_zero() {
        let (_, after) = example();
        let delta = compute_knowledge_delta(&after, &after);
        assert!(delta.is_empty());
        assert_eq!(delta.score, 0.0);
        assert!(delta_trace_event(&delta).is_none());

        let empty = KnowledgeSnapshot::default();
        assert!(compute_knowledge_delta(&empty, &empty).is_empty());
    }

    #[test]
    fn test_order_independent() {
        let (mut before, mut after) = example();
        let forward = compute_knowledge_delta(&before, &after);
        after.relations.reverse();
        after.properties.reverse();
        before.relations.reverse();
        assert_eq!(compute_knowledge_delta(&before, &after), forward);
    }

    #[test]
    fn test_downgrades_and_non_actual_moves_do_not_count() {
        let before = KnowledgeSnapshot {
            relations: vec![
                KnowledgeItem::new("a").with_modality(ModalityKind::Actual),
                KnowledgeItem::new("b").with_modality(ModalityKind::Possible),
            ],
            properties: vec![],
        };
        let after = KnowledgeSnapshot {
            relations: vec![
                KnowledgeItem::new("a").with_modality(ModalityKind::Possible),
                KnowledgeItem::new("b").with_modality(ModalityKind::Necessary),
            ],
            properties: vec![],
        };
        assert!(compute_knowledge_delta(&before, &after).is_empty());
    }

    #[test]
    fn test_missing_modality_upgrades_to_actual() {
        let before = KnowledgeSnapshot {
            relations: vec![KnowledgeItem::new("r")],
            properties: vec![],
        };
        let after = KnowledgeSnapshot {
            relations: vec![KnowledgeItem::new("r").with_modality(ModalityKind::Actual)],
            properties: vec![],
        };
        assert_eq!(compute_knowledge_delta(&before, &after).modality_upgrades, 1);
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let before = KnowledgeSnapshot::default();
        let after = KnowledgeSnapshot {
            relations: vec![KnowledgeItem::new("r"), KnowledgeItem::new("r")],
            properties: vec![KnowledgeItem::new("p"), KnowledgeItem::new("p")],
        };
        let delta = compute_knowledge_delta(&before, &after);
        assert_eq!(delta.new_relations, 1);
        assert_eq!(delta.new_properties, 1);
    }

    #[test]
    fn test_custom_weights() {
        let (before, after) = example();
        let weights = DeltaWeights {
            relation: 2.0,
            property: 1.0,
            upgrade: 0.0,
        };
        let delta = compute_knowledge_delta_weighted(&before, &after, &weights);
        assert!((delta.score - 3.0).abs() < EPS);
    }

    #[test]
    fn test_delta_event() {
        let (before, after) = example();
        let delta = compute_knowledge_delta(&before, &after);
        let event = delta_trace_event(&delta).unwrap();
        assert_eq!(event.kind, KNOWLEDGE_DELTA_KIND);
        assert_eq!(event.payload["score"], 3.5);
        assert_eq!(event.payload["details"]["upgradedRelationIds"], json!(["r1"]));
        assert!(event.is_kernel_sourced());

        let roundtrip: KnowledgeDelta = serde_json::from_value(event.payload).unwrap();
        assert_eq!(roundtrip, delta);
    }
}
