use std::fmt;
use std::str::FromStr;

use tracefold_core::error::ShapeError;

/// `<namespace>.<facade>.<op>`.
pub fn operation_id(namespace: &str, facade: &str, op: &str) -> String {
    format!("{namespace}.{facade}.{op}")
}

/// A parsed routing id. The op keeps any further dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    pub namespace: String,
    pub facade: String,
    pub op: String,
}

impl OperationId {
    pub fn new(
        namespace: impl Into<String>,
        facade: impl Into<String>,
        op: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            facade: facade.into(),
            op: op.into(),
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.facade, self.op)
    }
}

impl FromStr for OperationId {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(facade), Some(op))
                if !ns.is_empty() && !facade.is_empty() && !op.is_empty() =>
            {
                Ok(OperationId::new(ns, facade, op))
            }
            _ => Err(ShapeError::new(
                "model.id",
                format!("`{s}` is not of the form <namespace>.<facade>.<op>"),
            )),
        }
    }
}
