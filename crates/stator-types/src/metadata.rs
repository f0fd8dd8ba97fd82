//! Open metadata mapping attached to every tracked entity.
//!
//! Metadata accumulates across transitions: hook-returned deltas are merged
//! in, and the engine records diagnostics under reserved keys. It is never
//! wholesale-replaced, only merged, so a key survives until a later delta
//! overwrites it.

use std::collections::HashMap;

use serde_json::Value;

/// Mapping from string keys to arbitrary JSON values.
pub type Metadata = HashMap<String, Value>;

/// Reserved key under which the engine records unknown-state diagnostics
/// (condition, source state, args, timestamp).
pub const UNKNOWN_STATE_KEY: &str = "unknown_state";

/// Reserved key under which the engine records callback failure diagnostics
/// (condition, source state, destination, error message, timestamp).
pub const CALLBACK_ERROR_KEY: &str = "callback_error";

/// Merge `delta` into `target`.
///
/// New keys are added and conflicting keys are overwritten; keys absent
/// from `delta` survive untouched.
pub fn merge(target: &mut Metadata, delta: Metadata) {
    for (key, value) in delta {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_adds_new_keys() {
        let mut target = Metadata::new();
        target.insert("a".to_string(), json!(1));

        merge(&mut target, Metadata::from([("b".to_string(), json!(2))]));

        assert_eq!(target.get("a"), Some(&json!(1)));
        assert_eq!(target.get("b"), Some(&json!(2)));
    }

    #[test]
    fn merge_overwrites_conflicting_keys() {
        let mut target = Metadata::from([("a".to_string(), json!("old"))]);

        merge(&mut target, Metadata::from([("a".to_string(), json!("new"))]));

        assert_eq!(target.get("a"), Some(&json!("new")));
    }

    #[test]
    fn merge_of_empty_delta_is_a_noop() {
        let mut target = Metadata::from([("a".to_string(), json!(true))]);

        merge(&mut target, Metadata::new());

        assert_eq!(target.len(), 1);
        assert_eq!(target.get("a"), Some(&json!(true)));
    }
}
