//! Database schema management
//!
//! The schema has exactly two data tables plus a small meta table that tracks
//! the schema version. Data tables are append-only time series, so schema
//! management never drops them.

use crate::database::records::RecordKind;
use crate::error::{MetricsError, Result};
use rusqlite::Connection;

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

const META_TABLE_NAME: &str = "metrics_meta";

/// Schema definitions for all tables in the metrics database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS metrics_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    /// Source-control snapshots
    pub const GITHUB_DATA_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS github_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_updated TEXT NOT NULL,
            language TEXT NOT NULL,
            pull_requests INTEGER NOT NULL CHECK (pull_requests >= 0),
            open_issues INTEGER NOT NULL CHECK (open_issues >= 0),
            number_of_commits INTEGER NOT NULL CHECK (number_of_commits >= 0),
            number_of_branches INTEGER NOT NULL CHECK (number_of_branches >= 0),
            number_of_releases INTEGER NOT NULL CHECK (number_of_releases >= 0),
            number_of_contributors INTEGER NOT NULL CHECK (number_of_contributors >= 0),
            number_of_watchers INTEGER NOT NULL CHECK (number_of_watchers >= 0),
            number_of_stargazers INTEGER NOT NULL CHECK (number_of_stargazers >= 0),
            number_of_forks INTEGER NOT NULL CHECK (number_of_forks >= 0)
        );
    "#;

    /// Package-registry download snapshots
    pub const PACKAGE_MANAGER_DATA_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS package_manager_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_updated TEXT NOT NULL,
            csharp_downloads INTEGER NOT NULL CHECK (csharp_downloads >= 0),
            nodejs_downloads INTEGER NOT NULL CHECK (nodejs_downloads >= 0),
            php_downloads INTEGER NOT NULL CHECK (php_downloads >= 0),
            python_downloads INTEGER NOT NULL CHECK (python_downloads >= 0),
            ruby_downloads INTEGER NOT NULL CHECK (ruby_downloads >= 0)
        );
    "#;

    pub fn table_sql(kind: RecordKind) -> &'static str {
        match kind {
            RecordKind::GithubData => Self::GITHUB_DATA_TABLE,
            RecordKind::PackageManagerData => Self::PACKAGE_MANAGER_DATA_TABLE,
        }
    }
}

/// Schema manager for the metrics database
///
/// Handles schema initialization, version checking, and integrity checks.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates any missing tables and records the schema version. Existing
    /// tables and their rows are left untouched.
    pub fn initialize(&self) -> Result<()> {
        self.conn
            .execute(SchemaDefinitions::META_TABLE, [])
            .map_err(MetricsError::persistence("create table", META_TABLE_NAME))?;

        for kind in RecordKind::ALL {
            self.conn
                .execute(SchemaDefinitions::table_sql(kind), [])
                .map_err(MetricsError::persistence("create table", kind.table_name()))?;
        }

        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;

        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        if !self.table_exists(META_TABLE_NAME)? {
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version == SCHEMA_VERSION {
            match self.verify_integrity()? {
                None => Ok(SchemaStatus::Current),
                Some(table) => Ok(SchemaStatus::Corrupted { table }),
            }
        } else if current_version < SCHEMA_VERSION {
            Ok(SchemaStatus::NeedsMigration {
                from: current_version,
                to: SCHEMA_VERSION,
            })
        } else {
            // Database is from a newer version
            Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            })
        }
    }

    /// Get the schema version recorded in the database (0 when absent)
    pub fn get_schema_version(&self) -> Result<u32> {
        let version = self
            .get_meta("schema_version")?
            .unwrap_or_else(|| "0".to_string());

        version.parse().map_err(|_| MetricsError::Schema {
            table: META_TABLE_NAME.to_string(),
            reason: format!("invalid schema version '{}'", version),
        })
    }

    /// Find the first data table that is missing
    fn verify_integrity(&self) -> Result<Option<String>> {
        for kind in RecordKind::ALL {
            if !self.table_exists(kind.table_name())? {
                return Ok(Some(kind.table_name().to_string()));
            }
        }
        Ok(None)
    }

    /// Compare a table's columns against the record layout
    ///
    /// Returns an error when the table exists with a different column set or
    /// order; CSV exports depend on that order byte for byte.
    pub fn verify_columns(&self, kind: RecordKind) -> Result<()> {
        let table = kind.table_name();
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(MetricsError::persistence("inspect columns", table))?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
            .map_err(MetricsError::persistence("inspect columns", table))?;

        if columns.is_empty() || columns == kind.columns() {
            return Ok(());
        }

        Err(MetricsError::Schema {
            table: table.to_string(),
            reason: format!(
                "expected columns [{}], found [{}]",
                kind.columns().join(", "),
                columns.join(", ")
            ),
        })
    }

    fn table_exists(&self, table: &'static str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(MetricsError::persistence("inspect schema", table))?;
        Ok(count > 0)
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO metrics_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
                [key, value],
            )
            .map_err(MetricsError::persistence("set meta", META_TABLE_NAME))?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let result: rusqlite::Result<String> = self.conn.query_row(
            "SELECT value FROM metrics_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MetricsError::persistence("get meta", META_TABLE_NAME)(e)),
        }
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Schema was written by an older version
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// A data table is missing
    Corrupted { table: String },
}
