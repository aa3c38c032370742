//! A record store with an in-memory identifier index over a JSON Lines journal.
//!
//! # Terminology
//!
//! A _record_ is a JSON object. The value of its _identifier field_ (by default `"id"`) is its key:
//! the store holds at most one record per identifier. The [Journal](crate::journal::Journal) is the
//! source of truth; the [Index](crate::index::Index) is a cache rebuilt from it whenever the store
//! is opened.
//!
//! # Lifecycle
//!
//! 1. **Initialization**: Create with [Store::init] using a [Config]. Every persisted record with an
//!    identifier is loaded into the index.
//! 2. **Mutation**: [Store::insert], [Store::update] and [Store::delete] change the index and then
//!    rewrite the whole journal.
//! 3. **Queries**: [Store::get] answers from the index alone. [Store::find] and [Store::all] read the
//!    journal.
//!
//! # Example
//!
//! ```rust
//! use avldb_storage::{store::{Config, Store}, Record};
//! use prometheus_client::registry::Registry;
//! use serde_json::json;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let mut registry = Registry::default();
//! let mut store =
//!     Store::<i64>::init(&mut registry, Config::new(dir.path().join("people.jsonl"))).unwrap();
//!
//! // Insert a record
//! let serde_json::Value::Object(record) = json!({"id": 1, "name": "a"}) else {
//!     unreachable!()
//! };
//! store.insert(record).unwrap();
//!
//! // Fetch it by identifier
//! assert_eq!(store.get(&1).unwrap()["name"], "a");
//!
//! // Query every record with a predicate
//! let found = store
//!     .find(|r: &Record| Ok::<_, std::convert::Infallible>(r["name"] == "a"))
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//!
//! store.delete(&1).unwrap();
//! ```
//!
//! # Consistency
//!
//! Every mutation reads the journal once and rewrites it once. The two steps are not atomic and a
//! crash in the middle of a rewrite can truncate the journal. Concurrent use of the same file by
//! more than one store is not supported.

mod storage;
pub use storage::Store;

use crate::{journal, Identifier};
use std::path::PathBuf;

/// Default name of the identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Configuration for [Store].
#[derive(Clone, Debug)]
pub struct Config {
    /// Location of the journal file.
    pub path: PathBuf,

    /// Name of the field holding each record's identifier.
    pub id_field: String,
}

impl Config {
    /// Create a [Config] for the journal at `path` using the [DEFAULT_ID_FIELD].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }

    /// Use `id_field` as the identifier field.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }
}

/// Errors that can occur when interacting with a [Store].
#[derive(thiserror::Error, Debug)]
pub enum Error<K: Identifier> {
    #[error(transparent)]
    Journal(#[from] journal::Error),

    /// The record does not carry a usable identifier.
    #[error("record must have the field '{0}'")]
    MissingIdentifier(String),

    /// No record is stored under the identifier.
    #[error("no record with id={0}")]
    NotFound(K),
}
