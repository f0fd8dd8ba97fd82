//! Transition table: (source state, condition) -> destination state.

use std::collections::HashMap;

/// Mapping from (source state, condition label) to destination state.
///
/// States are opaque labels, not enumerated up front: the table may contain
/// orphan states and nothing validates that a destination is reachable.
/// Registration is last-write-wins -- inserting a (from, condition) pair
/// that already exists silently replaces the earlier destination.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    edges: HashMap<String, HashMap<String, String>>,
}

impl TransitionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an edge. Replaces any existing destination for the same
    /// (from, condition) pair.
    pub fn insert(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: impl Into<String>,
    ) {
        self.edges
            .entry(from.into())
            .or_default()
            .insert(condition.into(), to.into());
    }

    /// Destination for (from, condition), if one is registered.
    pub fn target(&self, from: &str, condition: &str) -> Option<&str> {
        self.edges.get(from)?.get(condition).map(String::as_str)
    }

    /// Number of registered edges across all source states.
    pub fn len(&self) -> usize {
        self.edges.values().map(HashMap::len).sum()
    }

    /// Whether no edges are registered.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
