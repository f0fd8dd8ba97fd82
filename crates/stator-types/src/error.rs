//! Error taxonomies for the engine and its storage port.

use thiserror::Error;

/// Errors surfaced by storage collaborators.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record exists for the requested entity id.
    #[error("entity not found")]
    NotFound,

    /// The backend failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by transition execution.
#[derive(Debug, Error)]
pub enum MachineError {
    /// No table entry for (current state, condition). A configuration
    /// error, not a transient one: it is never retried.
    #[error("invalid transition: no edge from '{from}' on condition '{condition}'")]
    InvalidTransition {
        /// State the entity was in when the transition was requested.
        from: String,
        /// Condition label that had no registered edge.
        condition: String,
    },

    /// A hook signaled it cannot classify the outcome. Always terminal for
    /// the current retry loop, whether or not a resolver was consulted.
    #[error("unknown state detected on condition '{condition}'")]
    UnknownState {
        /// Condition whose hook reported the unknown outcome.
        condition: String,
    },

    /// A hook explicitly reported failure.
    #[error("callback failed: {message}")]
    Callback {
        /// The hook's message, also recorded in the diagnostic metadata.
        message: String,
    },

    /// Storage write failed after the speculative state change; the state
    /// was rolled back to the source of the transition.
    #[error("persistence failed: {0}")]
    Persistence(#[from] RepositoryError),

    /// Retry budget exhausted without success. Supersedes the underlying
    /// cause; callers inspect the entity's diagnostic metadata for detail.
    #[error("max retries exceeded")]
    MaxRetriesExceeded,

    /// The caller's cancellation fired during a backoff wait.
    #[error("transition cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display_names_the_edge() {
        let err = MachineError::InvalidTransition {
            from: "created".to_string(),
            condition: "ship".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid transition: no edge from 'created' on condition 'ship'"
        );
    }

    #[test]
    fn persistence_error_wraps_repository_error() {
        let err = MachineError::from(RepositoryError::Backend("disk full".to_string()));
        assert_eq!(
            err.to_string(),
            "persistence failed: storage backend error: disk full"
        );
    }

    #[test]
    fn repository_not_found_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "entity not found");
    }
}
