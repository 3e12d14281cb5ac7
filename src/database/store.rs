//! Metrics store
//!
//! [`MetricsStore`] is the only point of contact with the database. It owns a
//! single session for its lifetime and exposes append, read-back, delete, and
//! export operations parametrized by record type.

use crate::database::core::{DatabaseConn, SchemaManager, SchemaStatus};
use crate::database::records::{PackageDownloadSnapshot, Record, RecordKind, SourceControlSnapshot};
use crate::error::{MetricsError, Result};
use crate::export::{self, DEFAULT_CSV_DIR};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Store for metric snapshots (SQLite backend)
///
/// Opening the store initializes any missing tables. Dropping it closes the
/// connection.
pub struct MetricsStore {
    db: DatabaseConn,
    csv_dir: PathBuf,
}

impl MetricsStore {
    /// Open the store at a generic connection URL
    ///
    /// The URL is normalized first. Tables are created if absent; a database
    /// written by a newer schema version, or with a different column layout,
    /// is refused rather than reset.
    pub fn open(url: &str) -> Result<Self> {
        let db = DatabaseConn::open_url(url)?;
        Self::prepare_schema(&db)?;

        Ok(Self {
            db,
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open("sqlite://")
    }

    /// Use `dir` for [`MetricsStore::export_table_to_csv`]
    pub fn with_csv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.csv_dir = dir.into();
        self
    }

    fn prepare_schema(db: &DatabaseConn) -> Result<()> {
        let schema = SchemaManager::new(&db.conn);

        match schema.check_status()? {
            SchemaStatus::Current => {
                info!("metrics database schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("initializing metrics database schema");
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                info!("upgrading metrics database schema from v{} to v{}", from, to);
                schema.initialize()?;
            }
            SchemaStatus::Corrupted { table } => {
                info!("metrics table '{}' is missing, recreating it", table);
                schema.initialize()?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                return Err(MetricsError::Schema {
                    table: "metrics_meta".to_string(),
                    reason: format!(
                        "database schema v{} is newer than supported v{}",
                        database_version, required_version
                    ),
                });
            }
        }

        for kind in RecordKind::ALL {
            schema.verify_columns(kind)?;
        }
        Ok(())
    }

    /// Insert `record` as a new row and return it with its assigned id
    ///
    /// Any id already set on `record` is ignored; the store always assigns a
    /// fresh one. The insert runs in its own transaction, so on error nothing
    /// is written and the session stays usable.
    pub fn add_data<R: Record>(&self, mut record: R) -> Result<R> {
        let table = R::KIND.table_name();
        let values = record
            .insert_values()
            .map_err(MetricsError::persistence("insert", table))?;

        let id = (|| -> rusqlite::Result<i64> {
            let tx = self.db.transaction()?;
            tx.execute(
                &R::KIND.insert_sql(),
                rusqlite::params_from_iter(values.iter()),
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })()
        .map_err(MetricsError::persistence("insert", table))?;

        debug!("inserted row {} into {}", id, table);
        record.set_id(id);
        Ok(record)
    }

    /// All rows of one record type, ordered by ascending id
    pub fn get_data<R: Record>(&self) -> Result<Vec<R>> {
        let table = R::KIND.table_name();
        let mut stmt = self
            .db
            .conn
            .prepare(&R::KIND.select_sql())
            .map_err(MetricsError::persistence("select", table))?;

        let rows = stmt
            .query_map([], |row| R::from_row(row))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<R>>>())
            .map_err(MetricsError::persistence("select", table))?;

        Ok(rows)
    }

    /// Delete the row with `id` from the table of `kind`
    ///
    /// Returns `true` if a row was removed. Deleting an id that does not
    /// exist is not an error and returns `false`.
    pub fn delete_data(&self, id: i64, kind: RecordKind) -> Result<bool> {
        let table = kind.table_name();
        let removed = self
            .db
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])
            .map_err(MetricsError::persistence("delete", table))?;

        debug!("delete id {} from {}: {} row(s) removed", id, table, removed);
        Ok(removed > 0)
    }

    /// Export every row of `kind` to `<csv_dir>/<table_name>.csv`
    pub fn export_table_to_csv(&self, kind: RecordKind) -> Result<PathBuf> {
        self.export_table_to_csv_in(kind, &self.csv_dir)
    }

    /// Export every row of `kind` to `<dir>/<table_name>.csv`
    pub fn export_table_to_csv_in(&self, kind: RecordKind, dir: &Path) -> Result<PathBuf> {
        match kind {
            RecordKind::GithubData => {
                export::export_records(dir, &self.get_data::<SourceControlSnapshot>()?)
            }
            RecordKind::PackageManagerData => {
                export::export_records(dir, &self.get_data::<PackageDownloadSnapshot>()?)
            }
        }
    }

    /// Number of rows stored for `kind`
    pub fn count(&self, kind: RecordKind) -> Result<u64> {
        self.db
            .table_count(kind.table_name())
            .map_err(MetricsError::persistence("count", kind.table_name()))
    }

    /// The most recently inserted row of one record type
    pub fn latest<R: Record>(&self) -> Result<Option<R>> {
        let table = R::KIND.table_name();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id DESC LIMIT 1",
            R::KIND.columns().join(", "),
            table
        );
        let result = self.db.conn.query_row(&sql, [], |row| R::from_row(row));

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MetricsError::persistence("select latest", table)(e)),
        }
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<u32> {
        SchemaManager::new(&self.db.conn).get_schema_version()
    }

    /// Directory used by [`MetricsStore::export_table_to_csv`]
    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }

    /// The normalized connection URL with its password masked
    pub fn url(&self) -> &str {
        self.db.url()
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }
}
