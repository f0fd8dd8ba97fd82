//! The transition engine: owns one entity's state and executes labeled
//! transitions against it.
//!
//! A transition attempt runs as a single exclusive critical section:
//! table lookup, before-hook, speculative state change, persistence, and
//! after-hook all happen under the entity's write lock. The retry loop
//! around it releases the lock between attempts and races each backoff
//! wait against the caller's cancellation token.

use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use stator_types::callback::{CallbackResult, CallbackStatus};
use stator_types::error::{MachineError, RepositoryError};
use stator_types::metadata::{self, CALLBACK_ERROR_KEY, Metadata, UNKNOWN_STATE_KEY};

use crate::repository::entity::EntityRepository;

use super::hooks::{HookPhase, HookRegistry, UnknownStateResolver};
use super::options::TransitionOptions;
use super::table::TransitionTable;

// ---------------------------------------------------------------------------
// MachineState
// ---------------------------------------------------------------------------

/// Mutable engine state guarded by the entity lock.
struct MachineState {
    current: String,
    table: TransitionTable,
    metadata: Metadata,
    hooks: HookRegistry,
}

// ---------------------------------------------------------------------------
// StateMachine
// ---------------------------------------------------------------------------

/// One tracked entity and its transition engine.
///
/// Generic over `R: EntityRepository` so any storage backend can record the
/// entity's snapshots. Every read or mutation of engine state is serialized
/// by a single reader/writer lock: registration takes it exclusively,
/// accessors take it shared, and a full transition attempt runs as one
/// exclusive critical section. Hooks therefore run while the entity is
/// locked -- at most one attempt is in flight per entity, at the cost of
/// blocking all other operations (including state reads) for the duration
/// of hook execution and the persistence call.
pub struct StateMachine<R: EntityRepository> {
    id: String,
    repo: R,
    resolver: Option<UnknownStateResolver>,
    state: RwLock<MachineState>,
}

impl<R: EntityRepository> StateMachine<R> {
    /// Create a machine in `initial_state` with an empty table and metadata.
    ///
    /// Without a resolver, a hook reporting an unknown outcome still aborts
    /// the transition but leaves the current state unchanged.
    pub fn new(
        id: impl Into<String>,
        initial_state: impl Into<String>,
        repo: R,
        resolver: Option<UnknownStateResolver>,
    ) -> Self {
        Self {
            id: id.into(),
            repo,
            resolver,
            state: RwLock::new(MachineState {
                current: initial_state.into(),
                table: TransitionTable::new(),
                metadata: Metadata::new(),
                hooks: HookRegistry::default(),
            }),
        }
    }

    /// Rebuild a machine from its persisted snapshot.
    ///
    /// Hydrates the current state and metadata from the repository;
    /// transition edges and hooks are runtime registrations and must be
    /// re-added by the caller. Fails with [`RepositoryError::NotFound`]
    /// when the repository has no record for `id`.
    pub async fn restore(
        id: impl Into<String>,
        repo: R,
        resolver: Option<UnknownStateResolver>,
    ) -> Result<Self, RepositoryError> {
        let id = id.into();
        let record = repo.load(&id).await?;
        Ok(Self {
            id,
            repo,
            resolver,
            state: RwLock::new(MachineState {
                current: record.state,
                table: TransitionTable::new(),
                metadata: record.metadata,
                hooks: HookRegistry::default(),
            }),
        })
    }

    /// Entity id.
    pub fn id(&self) -> &str {
        &self.id
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a transition edge.
    ///
    /// Last-write-wins: re-registering a (from, condition) pair replaces
    /// the earlier destination.
    pub async fn add_transition(&self, from: &str, to: &str, condition: &str) {
        let mut state = self.state.write().await;
        state.table.insert(from, to, condition);
    }

    /// Bind the before-hook for a condition; re-registration replaces.
    pub async fn register_before(
        &self,
        condition: &str,
        hook: impl Fn(&str, &str, &str, &Value) -> CallbackResult + Send + Sync + 'static,
    ) {
        let mut state = self.state.write().await;
        state
            .hooks
            .register(HookPhase::Before, condition, std::sync::Arc::new(hook));
    }

    /// Bind the after-hook for a condition; re-registration replaces.
    pub async fn register_after(
        &self,
        condition: &str,
        hook: impl Fn(&str, &str, &str, &Value) -> CallbackResult + Send + Sync + 'static,
    ) {
        let mut state = self.state.write().await;
        state
            .hooks
            .register(HookPhase::After, condition, std::sync::Arc::new(hook));
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Snapshot of the current state, taken under the shared lock.
    pub async fn current(&self) -> String {
        self.state.read().await.current.clone()
    }

    /// Defensive copy of the metadata mapping; mutating it cannot affect
    /// the engine.
    pub async fn metadata(&self) -> Metadata {
        self.state.read().await.metadata.clone()
    }

    // -----------------------------------------------------------------------
    // Transition execution
    // -----------------------------------------------------------------------

    /// Execute the transition labeled `condition`, retrying per `options`.
    ///
    /// Runs up to `max_retries + 1` attempts. An `UnknownState` outcome is
    /// terminal regardless of remaining budget (the machine does not know
    /// how to proceed; repeating the attempt cannot change that), and a
    /// missing table entry returns `InvalidTransition` immediately -- it is
    /// a configuration error, not a transient fault. Between attempts the
    /// backoff wait races the caller's cancellation token; cancellation
    /// wins by returning [`MachineError::Cancelled`] and discarding the
    /// remaining budget. When the budget is exhausted the engine returns
    /// [`MachineError::MaxRetriesExceeded`], superseding the last concrete
    /// cause -- the diagnostic metadata carries the detail.
    pub async fn transition(
        &self,
        cancel: &CancellationToken,
        condition: &str,
        args: Value,
        options: TransitionOptions,
    ) -> Result<(), MachineError> {
        for attempt in 0..=options.max_retries {
            match self.execute_transition(condition, &args).await {
                Ok(()) => return Ok(()),
                Err(err @ MachineError::UnknownState { .. }) => return Err(err),
                Err(err @ MachineError::InvalidTransition { .. }) => return Err(err),
                Err(err) if attempt < options.max_retries => {
                    let delay = (options.backoff)(attempt);
                    tracing::debug!(
                        entity_id = %self.id,
                        condition,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transition attempt failed, backing off"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(MachineError::Cancelled),
                    }
                }
                Err(_) => break,
            }
        }
        Err(MachineError::MaxRetriesExceeded)
    }

    /// One transition attempt under the exclusive entity lock.
    async fn execute_transition(&self, condition: &str, args: &Value) -> Result<(), MachineError> {
        let mut state = self.state.write().await;

        let from = state.current.clone();
        let Some(to) = state.table.target(&from, condition).map(str::to_string) else {
            return Err(MachineError::InvalidTransition {
                from,
                condition: condition.to_string(),
            });
        };

        // Before-hook: runs ahead of the state change, so a failure or an
        // unknown outcome leaves the current state untouched.
        if let Some(hook) = state.hooks.get(HookPhase::Before, condition).cloned() {
            let result = hook(condition, &from, &to, args);
            match result.status {
                CallbackStatus::Failure => {
                    return Err(self.record_callback_failure(
                        &mut state,
                        condition,
                        &from,
                        &to,
                        result.message,
                    ));
                }
                CallbackStatus::Unknown => {
                    return Err(self
                        .resolve_unknown_state(&mut state, condition, &from, args)
                        .await);
                }
                CallbackStatus::Success | CallbackStatus::Retry => {
                    if let Some(delta) = result.metadata {
                        metadata::merge(&mut state.metadata, delta);
                    }
                }
            }
        }

        // Speculative state change; durable only once the save succeeds.
        state.current = to.clone();
        if let Err(err) = self.repo.save(&self.id, &state.current, &state.metadata).await {
            state.current = from.clone(); // Rollback
            tracing::warn!(
                entity_id = %self.id,
                condition,
                from = %from,
                to = %to,
                error = %err,
                "persistence failed, state rolled back"
            );
            return Err(MachineError::Persistence(err));
        }

        // After-hook: the state change above is already committed, so a
        // failure or unknown outcome here is reported to the caller without
        // rolling the persisted state back.
        if let Some(hook) = state.hooks.get(HookPhase::After, condition).cloned() {
            let result = hook(condition, &from, &to, args);
            match result.status {
                CallbackStatus::Failure => {
                    return Err(self.record_callback_failure(
                        &mut state,
                        condition,
                        &from,
                        &to,
                        result.message,
                    ));
                }
                CallbackStatus::Unknown => {
                    return Err(self
                        .resolve_unknown_state(&mut state, condition, &from, args)
                        .await);
                }
                CallbackStatus::Success | CallbackStatus::Retry => {
                    if let Some(delta) = result.metadata {
                        metadata::merge(&mut state.metadata, delta);
                    }
                }
            }
        }

        tracing::debug!(
            entity_id = %self.id,
            condition,
            from = %from,
            to = %to,
            "transition committed"
        );
        Ok(())
    }

    /// Record callback failure diagnostics under the reserved key and build
    /// the error returned to the caller.
    fn record_callback_failure(
        &self,
        state: &mut MachineState,
        condition: &str,
        from: &str,
        to: &str,
        message: String,
    ) -> MachineError {
        state.metadata.insert(
            CALLBACK_ERROR_KEY.to_string(),
            json!({
                "condition": condition,
                "from": from,
                "to": to,
                "error": message,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );
        MachineError::Callback { message }
    }

    /// Resolve an unknown outcome: hand the decision to the resolver (if
    /// any), persist the resolved state best-effort, and record diagnostics.
    ///
    /// The save here is deliberately fire-and-forget: the machine must not
    /// get stuck merely because a diagnostic write failed. Its error is
    /// logged and discarded.
    async fn resolve_unknown_state(
        &self,
        state: &mut MachineState,
        condition: &str,
        from: &str,
        args: &Value,
    ) -> MachineError {
        if let Some(resolver) = &self.resolver {
            state.current = resolver(from, condition, args);
            if let Err(err) = self.repo.save(&self.id, &state.current, &state.metadata).await {
                tracing::warn!(
                    entity_id = %self.id,
                    condition,
                    resolved_state = %state.current,
                    error = %err,
                    "best-effort save after unknown-state resolution failed"
                );
            }
        }

        state.metadata.insert(
            UNKNOWN_STATE_KEY.to_string(),
            json!({
                "condition": condition,
                "from": from,
                "args": args,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        );
        MachineError::UnknownState {
            condition: condition.to_string(),
        }
    }
}

impl<R: EntityRepository> std::fmt::Debug for StateMachine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine").field("id", &self.id).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
