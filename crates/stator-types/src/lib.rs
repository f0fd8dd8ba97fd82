//! Shared domain types for Stator.
//!
//! This crate contains the types that cross crate boundaries: the callback
//! protocol vocabulary, the open metadata mapping with its reserved
//! diagnostic keys, the persisted entity snapshot, and the error taxonomies.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod callback;
pub mod error;
pub mod metadata;
pub mod record;
