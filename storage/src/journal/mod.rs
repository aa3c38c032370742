//! A line-oriented log of JSON records.
//!
//! # Format
//!
//! Each line of the backing file holds one self-contained JSON object (JSON Lines), encoded as
//! UTF-8 with no framing beyond the terminating newline:
//!
//! ```text
//! {"id":1,"name":"a"}
//! {"id":2,"name":"b","tags":["x","y"]}
//! ```
//!
//! # Rewrites
//!
//! [Journal] never appends. [Journal::save_all] truncates the file and writes the full set of
//! records, so after a successful call the file is exactly one snapshot. A crash in the middle of a
//! rewrite can leave the file truncated.
//!
//! # Corruption
//!
//! [Journal::load_all] skips (and logs) any line that does not decode to a JSON object rather than
//! failing the whole read. The remaining records are returned in file order.

mod disk;
pub use disk::Journal;

use thiserror::Error;

/// Errors that can occur when interacting with the [Journal].
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}
