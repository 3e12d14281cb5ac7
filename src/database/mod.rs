//! Database module
//!
//! This module provides all persistence for library-metrics, organized into:
//!
//! - **core**: connection URL normalization, SQLite sessions, schema management
//! - **records**: the two snapshot record types and their table layout
//! - **store**: the metrics store (append, read back, delete, export)
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # URL normalization and DatabaseConn wrapper
//! │   └── schema      # Table definitions and integrity checks
//! │
//! ├── records         # SourceControlSnapshot, PackageDownloadSnapshot, RecordKind
//! └── store           # MetricsStore
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use library_metrics::database::{MetricsStore, RecordKind, SourceControlSnapshot};
//!
//! let store = MetricsStore::open("sqlite:///metrics.db")?;
//!
//! let mut snapshot = SourceControlSnapshot::new("sendgrid-python");
//! snapshot.number_of_stargazers = 1200;
//! let stored = store.add_data(snapshot)?;
//!
//! let rows = store.get_data::<SourceControlSnapshot>()?;
//! store.export_table_to_csv(RecordKind::GithubData)?;
//! store.delete_data(stored.id.unwrap_or_default(), RecordKind::GithubData)?;
//! ```

pub mod core;
pub mod records;
pub mod store;

pub use self::core::{
    normalize_connection_url, redact_url, sqlite_target, DatabaseConn, Dialect, SchemaDefinitions,
    SchemaManager, SchemaStatus, SqliteTarget, MYSQL_DRIVER, SCHEMA_VERSION,
};

pub use records::{
    PackageDownloadSnapshot, Record, RecordKind, SourceControlSnapshot, TIMESTAMP_FORMAT,
};

pub use store::MetricsStore;
