//! Entity repository trait definition.
//!
//! The engine calls `save` synchronously within a transition attempt: the
//! write must complete (success or failure) before the transition's outcome
//! is decided. The single exception is the explicitly best-effort save after
//! unknown-state resolution, whose error the engine logs and discards.

use stator_types::error::RepositoryError;
use stator_types::metadata::Metadata;
use stator_types::record::EntityRecord;

/// Storage port for entity state snapshots.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// Implementations live in stator-infra.
pub trait EntityRepository: Send + Sync {
    /// Persist the snapshot for an entity (upsert by id).
    fn save(
        &self,
        id: &str,
        state: &str,
        metadata: &Metadata,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load the stored snapshot for an entity.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the id is unknown.
    fn load(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<EntityRecord, RepositoryError>> + Send;
}

/// A shared repository handle is itself a repository, so one backend can
/// serve many machines (and remain inspectable by the caller).
impl<R: EntityRepository> EntityRepository for std::sync::Arc<R> {
    async fn save(
        &self,
        id: &str,
        state: &str,
        metadata: &Metadata,
    ) -> Result<(), RepositoryError> {
        (**self).save(id, state, metadata).await
    }

    async fn load(&self, id: &str) -> Result<EntityRecord, RepositoryError> {
        (**self).load(id).await
    }
}
