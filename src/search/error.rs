//! Error types for similarity-search operations.
//!
//! Configuration and type-mismatch errors are caller errors and are never
//! retried by this crate. External-tool failures carry the raw stderr of the
//! subprocess so the caller can diagnose or escalate; builds are
//! side-effecting and must not be retried automatically.

use super::{DbType, Program};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when building or querying a search database.
#[derive(Debug, Error)]
pub enum Error {
    /// A required file, directory, or executable is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A database is already bound to this handle.
    ///
    /// Raised by [`SearchIndex::build`](super::SearchIndex::build) when a
    /// location is bound and `overwrite` was not requested.
    #[error("a database is already bound at '{0}'; enable overwrite to rebind")]
    AlreadyExists(PathBuf),

    /// The query program and the bound database disagree on sequence type.
    ///
    /// Checked before any subprocess is spawned and never coerced.
    #[error("program '{program}' requires a {required} database but the bound database is {actual}")]
    TypeMismatch {
        /// The requested query program.
        program: Program,
        /// The database type that program searches.
        required: DbType,
        /// The type of the bound database.
        actual: DbType,
    },

    /// The external tool exited with a non-zero status.
    #[error("{program} exited with status {status}: {stderr}")]
    ExternalTool {
        /// Name of the invoked executable.
        program: String,
        /// Process exit code (`-1` if terminated by a signal).
        status: i32,
        /// Raw stderr captured from the subprocess.
        stderr: String,
    },

    /// The external tool did not finish within the allotted time.
    ///
    /// The subprocess is killed before this error is returned.
    #[error("{program} did not finish within {limit_secs} s and was killed")]
    Timeout {
        /// Name of the invoked executable.
        program: String,
        /// The configured limit, in seconds.
        limit_secs: u64,
    },

    /// Search output could not be parsed into the requested representation.
    #[error("failed to parse search output: {0}")]
    OutputParse(String),

    /// JSON output (outfmt 15) could not be deserialized.
    #[error("failed to parse JSON search output: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
