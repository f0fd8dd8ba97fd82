//! In-memory entity repository.
//!
//! Reference implementation of `EntityRepository` for tests and wiring
//! examples. Snapshots live in a concurrent map; records are cloned on
//! both save and load so callers never alias the stored data.

use dashmap::DashMap;

use stator_core::repository::entity::EntityRepository;
use stator_types::error::RepositoryError;
use stator_types::metadata::Metadata;
use stator_types::record::EntityRecord;

/// In-memory `EntityRepository` backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryEntityRepository {
    records: DashMap<String, EntityRecord>,
}

impl InMemoryEntityRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no entities are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EntityRepository for InMemoryEntityRepository {
    async fn save(
        &self,
        id: &str,
        state: &str,
        metadata: &Metadata,
    ) -> Result<(), RepositoryError> {
        self.records
            .insert(id.to_string(), EntityRecord::new(state, metadata.clone()));
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<EntityRecord, RepositoryError> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let repo = InMemoryEntityRepository::new();
        let metadata = Metadata::from([("order_id".to_string(), json!("order-1"))]);

        repo.save("order-1", "processing", &metadata).await.unwrap();
        let record = repo.load("order-1").await.unwrap();

        assert_eq!(record.state, "processing");
        assert_eq!(record.metadata, metadata);
    }

    #[tokio::test]
    async fn load_of_unknown_id_fails_with_not_found() {
        let repo = InMemoryEntityRepository::new();

        let err = repo.load("ghost").await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let repo = InMemoryEntityRepository::new();

        repo.save("order-1", "created", &Metadata::new()).await.unwrap();
        repo.save("order-1", "processing", &Metadata::new()).await.unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.load("order-1").await.unwrap().state, "processing");
    }

    #[tokio::test]
    async fn engine_persists_through_in_memory_repository() {
        use std::sync::Arc;
        use stator_core::fsm::machine::StateMachine;
        use stator_core::fsm::options::TransitionOptions;
        use stator_types::callback::CallbackResult;
        use tokio_util::sync::CancellationToken;

        let repo = Arc::new(InMemoryEntityRepository::new());
        let machine = StateMachine::new("order-1", "created", Arc::clone(&repo), None);
        machine.add_transition("created", "processing", "process").await;
        machine
            .register_before("process", |_, _, _, _| {
                CallbackResult::success()
                    .with_metadata(Metadata::from([("charge_id".to_string(), json!("ch_1"))]))
            })
            .await;

        machine
            .transition(
                &CancellationToken::new(),
                "process",
                json!({"amount": 42}),
                TransitionOptions::default(),
            )
            .await
            .unwrap();

        let record = repo.load("order-1").await.unwrap();
        assert_eq!(record.state, "processing");
        assert_eq!(record.metadata.get("charge_id"), Some(&json!("ch_1")));
    }

    #[tokio::test]
    async fn loaded_record_is_a_copy() {
        let repo = InMemoryEntityRepository::new();
        repo.save("order-1", "created", &Metadata::new()).await.unwrap();

        let mut record = repo.load("order-1").await.unwrap();
        record.state = "tampered".to_string();
        record.metadata.insert("x".to_string(), json!(1));

        let reloaded = repo.load("order-1").await.unwrap();
        assert_eq!(reloaded.state, "created");
        assert!(reloaded.metadata.is_empty());
    }
}
