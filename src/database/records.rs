//! Metric record types
//!
//! Two flat snapshot schemas share the same identity/timestamp shape. The
//! closed [`RecordKind`] enum carries the table name and column order for each,
//! so nothing downstream dispatches on raw table-name strings.

use chrono::{NaiveDateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text format used for `date_updated` in the database and in CSV exports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The two persisted record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RecordKind {
    /// Source-control statistics, one row per tracked repository per run
    #[cfg_attr(feature = "cli", value(name = "github_data"))]
    GithubData,
    /// Package-registry download counts, one row per run
    #[cfg_attr(feature = "cli", value(name = "package_manager_data"))]
    PackageManagerData,
}

const GITHUB_DATA_COLUMNS: &[&str] = &[
    "id",
    "date_updated",
    "language",
    "pull_requests",
    "open_issues",
    "number_of_commits",
    "number_of_branches",
    "number_of_releases",
    "number_of_contributors",
    "number_of_watchers",
    "number_of_stargazers",
    "number_of_forks",
];

const PACKAGE_MANAGER_DATA_COLUMNS: &[&str] = &[
    "id",
    "date_updated",
    "csharp_downloads",
    "nodejs_downloads",
    "php_downloads",
    "python_downloads",
    "ruby_downloads",
];

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::GithubData, RecordKind::PackageManagerData];

    pub fn table_name(&self) -> &'static str {
        match self {
            RecordKind::GithubData => "github_data",
            RecordKind::PackageManagerData => "package_manager_data",
        }
    }

    /// Column names in field declaration order, `id` first
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::GithubData => GITHUB_DATA_COLUMNS,
            RecordKind::PackageManagerData => PACKAGE_MANAGER_DATA_COLUMNS,
        }
    }

    /// Comma-joined column list, exactly as written on the first CSV line
    pub fn csv_header(&self) -> String {
        self.columns().join(",")
    }

    pub(crate) fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY id ASC",
            self.columns().join(", "),
            self.table_name()
        )
    }

    pub(crate) fn insert_sql(&self) -> String {
        let columns = &self.columns()[1..];
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table_name(),
            columns.join(", "),
            placeholders.join(", ")
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github_data" => Ok(RecordKind::GithubData),
            "package_manager_data" => Ok(RecordKind::PackageManagerData),
            _ => Err(format!(
                "Unknown table '{}'. Valid tables: github_data, package_manager_data",
                s
            )),
        }
    }
}

/// Mapping between a snapshot struct and its table row
///
/// `insert_values` yields every column except `id`, in column order; `fields`
/// yields every column including `id`, rendered as text for exports.
pub trait Record: Sized {
    const KIND: RecordKind;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    fn date_updated(&self) -> NaiveDateTime;

    fn insert_values(&self) -> rusqlite::Result<Vec<Value>>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn fields(&self) -> Vec<String>;
}

/// Source-control statistics for one tracked repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceControlSnapshot {
    pub id: Option<i64>,
    pub date_updated: NaiveDateTime,
    /// Repository identifier. The column name is kept for export compatibility.
    pub language: String,
    pub pull_requests: u64,
    pub open_issues: u64,
    pub number_of_commits: u64,
    pub number_of_branches: u64,
    pub number_of_releases: u64,
    pub number_of_contributors: u64,
    pub number_of_watchers: u64,
    pub number_of_stargazers: u64,
    pub number_of_forks: u64,
}

impl SourceControlSnapshot {
    /// Create a zeroed snapshot for `repo` captured now
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            id: None,
            date_updated: Utc::now().naive_utc(),
            language: repo.into(),
            pull_requests: 0,
            open_issues: 0,
            number_of_commits: 0,
            number_of_branches: 0,
            number_of_releases: 0,
            number_of_contributors: 0,
            number_of_watchers: 0,
            number_of_stargazers: 0,
            number_of_forks: 0,
        }
    }
}

impl Record for SourceControlSnapshot {
    const KIND: RecordKind = RecordKind::GithubData;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn date_updated(&self) -> NaiveDateTime {
        self.date_updated
    }

    fn insert_values(&self) -> rusqlite::Result<Vec<Value>> {
        Ok(vec![
            timestamp_value(&self.date_updated),
            Value::Text(self.language.clone()),
            counter_value(self.pull_requests)?,
            counter_value(self.open_issues)?,
            counter_value(self.number_of_commits)?,
            counter_value(self.number_of_branches)?,
            counter_value(self.number_of_releases)?,
            counter_value(self.number_of_contributors)?,
            counter_value(self.number_of_watchers)?,
            counter_value(self.number_of_stargazers)?,
            counter_value(self.number_of_forks)?,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            date_updated: timestamp(row, 1)?,
            language: row.get(2)?,
            pull_requests: counter(row, 3)?,
            open_issues: counter(row, 4)?,
            number_of_commits: counter(row, 5)?,
            number_of_branches: counter(row, 6)?,
            number_of_releases: counter(row, 7)?,
            number_of_contributors: counter(row, 8)?,
            number_of_watchers: counter(row, 9)?,
            number_of_stargazers: counter(row, 10)?,
            number_of_forks: counter(row, 11)?,
        })
    }

    fn fields(&self) -> Vec<String> {
        vec![
            format_id(self.id),
            self.date_updated.format(TIMESTAMP_FORMAT).to_string(),
            self.language.clone(),
            self.pull_requests.to_string(),
            self.open_issues.to_string(),
            self.number_of_commits.to_string(),
            self.number_of_branches.to_string(),
            self.number_of_releases.to_string(),
            self.number_of_contributors.to_string(),
            self.number_of_watchers.to_string(),
            self.number_of_stargazers.to_string(),
            self.number_of_forks.to_string(),
        ]
    }
}

/// Download counts across the tracked package registries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDownloadSnapshot {
    pub id: Option<i64>,
    pub date_updated: NaiveDateTime,
    pub csharp_downloads: u64,
    pub nodejs_downloads: u64,
    pub php_downloads: u64,
    pub python_downloads: u64,
    pub ruby_downloads: u64,
}

impl PackageDownloadSnapshot {
    /// Create a zeroed snapshot captured now
    pub fn new() -> Self {
        Self {
            id: None,
            date_updated: Utc::now().naive_utc(),
            csharp_downloads: 0,
            nodejs_downloads: 0,
            php_downloads: 0,
            python_downloads: 0,
            ruby_downloads: 0,
        }
    }
}

impl Default for PackageDownloadSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for PackageDownloadSnapshot {
    const KIND: RecordKind = RecordKind::PackageManagerData;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn date_updated(&self) -> NaiveDateTime {
        self.date_updated
    }

    fn insert_values(&self) -> rusqlite::Result<Vec<Value>> {
        Ok(vec![
            timestamp_value(&self.date_updated),
            counter_value(self.csharp_downloads)?,
            counter_value(self.nodejs_downloads)?,
            counter_value(self.php_downloads)?,
            counter_value(self.python_downloads)?,
            counter_value(self.ruby_downloads)?,
        ])
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            date_updated: timestamp(row, 1)?,
            csharp_downloads: counter(row, 2)?,
            nodejs_downloads: counter(row, 3)?,
            php_downloads: counter(row, 4)?,
            python_downloads: counter(row, 5)?,
            ruby_downloads: counter(row, 6)?,
        })
    }

    fn fields(&self) -> Vec<String> {
        vec![
            format_id(self.id),
            self.date_updated.format(TIMESTAMP_FORMAT).to_string(),
            self.csharp_downloads.to_string(),
            self.nodejs_downloads.to_string(),
            self.php_downloads.to_string(),
            self.python_downloads.to_string(),
            self.ruby_downloads.to_string(),
        ]
    }
}

fn format_id(id: Option<i64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

fn timestamp_value(ts: &NaiveDateTime) -> Value {
    Value::Text(ts.format(TIMESTAMP_FORMAT).to_string())
}

// SQLite integers are signed; counters above i64::MAX cannot be stored.
fn counter_value(value: u64) -> rusqlite::Result<Value> {
    i64::try_from(value)
        .map(Value::Integer)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn counter(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
