//! Persisted entity snapshot.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// The snapshot a storage collaborator keeps for one entity: the current
/// state label plus accumulated metadata.
///
/// No on-disk or wire layout is mandated -- implementations encode the
/// record however they choose; the serde derives are a convenience for
/// backends that serialize it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Current state label.
    pub state: String,
    /// Accumulated metadata mapping.
    #[serde(default)]
    pub metadata: Metadata,
}

impl EntityRecord {
    /// Create a record from a state label and metadata mapping.
    pub fn new(state: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            state: state.into(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrips_through_json() {
        let record = EntityRecord::new(
            "processing",
            Metadata::from([("order_id".to_string(), json!("order-1"))]),
        );

        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: EntityRecord = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn metadata_defaults_to_empty_when_absent() {
        let decoded: EntityRecord = serde_json::from_str(r#"{"state":"created"}"#).unwrap();
        assert_eq!(decoded.state, "created");
        assert!(decoded.metadata.is_empty());
    }
}
