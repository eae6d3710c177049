use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::JsonMap;

/// Epistemic qualifier on a relation. Unknown kinds are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModalityKind {
    Possible,
    Actual,
    Necessary,
    Other(String),
}

impl ModalityKind {
    pub fn as_str(&self) -> &str {
        match self {
            ModalityKind::Possible => "possible",
            ModalityKind::Actual => "actual",
            ModalityKind::Necessary => "necessary",
            ModalityKind::Other(s) => s,
        }
    }
}

impl From<String> for ModalityKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "possible" => ModalityKind::Possible,
            "actual" => ModalityKind::Actual,
            "necessary" => ModalityKind::Necessary,
            _ => ModalityKind::Other(s),
        }
    }
}

impl From<ModalityKind> for String {
    fn from(kind: ModalityKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Modality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub kind: Option<ModalityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemProvenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A relation or property with a stable id. Other attributes ride along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ItemProvenance>,
    #[serde(flatten)]
    pub attributes: JsonMap,
}

impl KnowledgeItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provenance: None,
            attributes: JsonMap::new(),
        }
    }

    pub fn with_modality(mut self, kind: ModalityKind) -> Self {
        let provenance = self.provenance.get_or_insert_with(Default::default);
        provenance.modality.get_or_insert_with(Default::default).kind = Some(kind);
        self
    }

    /// `provenance.modality.kind`, treated as `possible` when absent.
    pub fn modality_kind(&self) -> ModalityKind {
        self.provenance
            .as_ref()
            .and_then(|p| p.modality.as_ref())
            .and_then(|m| m.kind.clone())
            .unwrap_or(ModalityKind::Possible)
    }

    pub fn is_actual(&self) -> bool {
        self.modality_kind() == ModalityKind::Actual
    }
}

/// Relations and properties at one point of a computation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeSnapshot {
    #[serde(default)]
    pub relations: Vec<KnowledgeItem>,
    #[serde(default)]
    pub properties: Vec<KnowledgeItem>,
}

/// Score weights. A new relation counts 1, a new property half of that, an
/// upgrade to `actual` twice that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeltaWeights {
    pub relation: f64,
    pub property: f64,
    pub upgrade: f64,
}

impl Default for DeltaWeights {
    fn default() -> Self {
        Self {
            relation: 1.0,
            property: 0.5,
            upgrade: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeltaDetails {
    pub new_relation_ids: Vec<String>,
    pub new_property_ids: Vec<String>,
    pub upgraded_relation_ids: Vec<String>,
}

/// How much new or upgraded knowledge a pass produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDelta {
    pub new_relations: usize,
    pub new_properties: usize,
    pub modality_upgrades: usize,
    pub score: f64,
    pub details: DeltaDetails,
}

impl KnowledgeDelta {
    pub fn is_empty(&self) -> bool {
        self.new_relations == 0 && self.new_properties == 0 && self.modality_upgrades == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_modality_defaults_to_possible() {
        let item: KnowledgeItem = serde_json::from_value(json!({"id": "r2"})).unwrap();
        assert_eq!(item.modality_kind(), ModalityKind::Possible);

        let item: KnowledgeItem =
            serde_json::from_value(json!({"id": "r3", "provenance": {"modality": {}}})).unwrap();
        assert_eq!(item.modality_kind(), ModalityKind::Possible);
    }

    #[test]
    fn test_modality_kind_roundtrip_keeps_unknown() {
        let item: KnowledgeItem = serde_json::from_value(json!({
            "id": "r1",
            "type": "LINKS_TO",
            "provenance": {"modality": {"kind": "counterfactual", "confidence": 0.4}, "source": "ground"}
        }))
        .unwrap();
        assert_eq!(
            item.modality_kind(),
            ModalityKind::Other("counterfactual".into())
        );
        assert_eq!(item.attributes["type"], "LINKS_TO");

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["provenance"]["modality"]["kind"], "counterfactual");
        assert_eq!(back["provenance"]["source"], "ground");
    }

    #[test]
    fn test_with_modality() {
        let item = KnowledgeItem::new("r1").with_modality(ModalityKind::Actual);
        assert!(item.is_actual());
    }

    #[test]
    fn test_default_weights() {
        let w = DeltaWeights::default();
        assert_eq!((w.relation, w.property, w.upgrade), (1.0, 0.5, 2.0));
    }
}
