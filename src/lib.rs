#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! library-metrics - popularity metrics for open source libraries
//!
//! library-metrics stores periodic snapshots of a project's source-control
//! statistics (commits, stars, forks, issues, releases, contributors) and its
//! package-registry download counts, and exports them as CSV. It can be used
//! as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | CLI binary | `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: connection normalization, record types, the metrics store
//! - **[`export`]**: CSV export with a fixed, schema-derived header
//! - **[`collect`]**: collaborator traits and the batch collection routine
//! - **[`output`]**: terminal output formats
//! - **[`config`]**: configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use library_metrics::{MetricsStore, PackageDownloadSnapshot, RecordKind};
//!
//! // "mysql://..." is rewritten to "mysql+pymysql://..." before opening
//! let store = MetricsStore::open("sqlite:////var/lib/metrics/metrics.sqlite3")?;
//!
//! let mut downloads = PackageDownloadSnapshot::new();
//! downloads.python_downloads = 1_500_000;
//! let stored = store.add_data(downloads)?;
//! println!("stored snapshot {:?}", stored.id);
//!
//! // Writes ./csv/package_manager_data.csv
//! store.export_table_to_csv(RecordKind::PackageManagerData)?;
//! ```

pub mod collect;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod output;

pub use config::MetricsConfig;
pub use error::{MetricsError, Result};

pub use database::{
    normalize_connection_url, MetricsStore, PackageDownloadSnapshot, Record, RecordKind,
    SourceControlSnapshot,
};

pub use collect::{
    run_collection, CollectionSummary, PackageRegistrySource, ReportSender, SourceControlSource,
};
pub use output::OutputFormat;
