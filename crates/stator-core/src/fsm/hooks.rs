//! Hook registry and the function seams callers plug into the engine.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use stator_types::callback::CallbackResult;

/// A before/after hook: `(condition, from, to, args) -> CallbackResult`.
///
/// `args` is the opaque payload handed to `transition`, passed through
/// unexamined. Hooks run while the entity is locked, so they must not call
/// back into the machine; mutations are communicated solely through the
/// returned result.
pub type Hook = Arc<dyn Fn(&str, &str, &str, &Value) -> CallbackResult + Send + Sync>;

/// Resolver consulted when a hook reports an unknown outcome:
/// `(current_state, condition, args) -> new_state`.
///
/// The returned state is trusted unconditionally; the engine does not check
/// it against the transition table.
pub type UnknownStateResolver = Arc<dyn Fn(&str, &str, &Value) -> String + Send + Sync>;

/// The phase a hook is bound to, relative to the state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Runs ahead of the state change; a failure leaves state untouched.
    Before,
    /// Runs after the state change has been persisted.
    After,
}

/// Per-condition hook registrations.
///
/// At most one before-hook and one after-hook per condition;
/// re-registration replaces the earlier hook.
#[derive(Default)]
pub struct HookRegistry {
    before: HashMap<String, Hook>,
    after: HashMap<String, Hook>,
}

impl HookRegistry {
    /// Bind a hook to a condition for the given phase, replacing any
    /// earlier registration.
    pub fn register(&mut self, phase: HookPhase, condition: impl Into<String>, hook: Hook) {
        let slot = match phase {
            HookPhase::Before => &mut self.before,
            HookPhase::After => &mut self.after,
        };
        slot.insert(condition.into(), hook);
    }

    /// The hook bound to (phase, condition), if any.
    pub fn get(&self, phase: HookPhase, condition: &str) -> Option<&Hook> {
        match phase {
            HookPhase::Before => self.before.get(condition),
            HookPhase::After => self.after.get(condition),
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}
