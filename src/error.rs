//! Error types for the metrics store
//!
//! Every failure surfaced by the storage layer carries the operation, the table
//! it touched, and the underlying cause. Nothing is retried or swallowed here;
//! the caller decides whether to abort the batch or skip a metric.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the storage layer
pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
    /// The normalized URL could not establish a session
    #[error("failed to connect to '{url}': {reason}")]
    Connection { url: String, reason: String },

    /// A statement failed against an otherwise live session
    #[error("{operation} on table '{table}' failed: {source}")]
    Persistence {
        operation: &'static str,
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Writing a CSV export failed
    #[error("failed to export table '{table}' to {}: {source}", .path.display())]
    Export {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database schema does not match the record layout
    #[error("schema mismatch on table '{table}': {reason}")]
    Schema { table: String, reason: String },
}

impl MetricsError {
    pub(crate) fn persistence(
        operation: &'static str,
        table: &'static str,
    ) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| MetricsError::Persistence {
            operation,
            table,
            source,
        }
    }
}
