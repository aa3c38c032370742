//! Persist JSON records in a line-oriented log indexed by an in-memory AVL tree.
//!
//! # Status
//!
//! `avldb-storage` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

pub mod identifier;
pub mod index;
pub mod journal;
pub mod store;

pub use identifier::Identifier;

/// A stored entity: a JSON object with an open set of fields.
///
/// Field order is preserved across a write and a subsequent read of the log.
pub type Record = serde_json::Map<String, serde_json::Value>;
