//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DatabaseConn`: SQLite session opened from a normalized connection URL
//! - `normalize_connection_url`: driver-qualified URL rewriting
//! - `SchemaManager`: Schema initialization and integrity checks
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::{
    normalize_connection_url, redact_url, sqlite_target, DatabaseConn, Dialect, SqliteTarget,
    MYSQL_DRIVER,
};
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};
