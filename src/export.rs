//! CSV export of persisted snapshots
//!
//! Each record kind is written to `<dir>/<table_name>.csv`. The header line is
//! the record's column list in declaration order and is a compatibility
//! surface for downstream consumers, so it must stay byte-exact.

use crate::database::records::{Record, RecordKind};
use crate::error::{MetricsError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default export directory, relative to the working directory
pub const DEFAULT_CSV_DIR: &str = "./csv";

/// Path of the export file for `kind` inside `dir`
pub fn csv_path(dir: &Path, kind: RecordKind) -> PathBuf {
    dir.join(format!("{}.csv", kind.table_name()))
}

/// Write `records` to `<dir>/<table_name>.csv`, replacing any existing file
///
/// The directory is created if needed. The file is replaced atomically: on
/// failure the previous contents (or absence) of the target are preserved.
pub fn export_records<R: Record>(dir: &Path, records: &[R]) -> Result<PathBuf> {
    let kind = R::KIND;
    let path = csv_path(dir, kind);
    let fail = |source: io::Error| MetricsError::Export {
        table: kind.table_name(),
        path: path.clone(),
        source,
    };

    let data = render_csv(records).map_err(fail)?;
    fs::create_dir_all(dir).map_err(fail)?;
    write_atomic(&path, &data).map_err(fail)?;

    info!(
        "exported {} rows from {} to {}",
        records.len(),
        kind.table_name(),
        path.display()
    );
    Ok(path)
}

/// Render the header plus one CSV record per snapshot
///
/// A field holding a line break is quoted and spans several physical lines,
/// so row counts hold per CSV record rather than per line.
pub fn render_csv<R: Record>(records: &[R]) -> io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(R::KIND.columns())?;
    for record in records {
        writer.write_record(record.fields())?;
    }

    writer.into_inner().map_err(|e| e.into_error())
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::records::{PackageDownloadSnapshot, SourceControlSnapshot};
    use chrono::NaiveDate;

    fn fixed_snapshot(id: i64, repo: &str) -> SourceControlSnapshot {
        let mut snapshot = SourceControlSnapshot::new(repo);
        snapshot.id = Some(id);
        snapshot.date_updated = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        snapshot.number_of_stargazers = 42;
        snapshot
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<PackageDownloadSnapshot> = vec![];

        let path = export_records(dir.path(), &records).unwrap();

        assert_eq!(path, dir.path().join("package_manager_data.csv"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "id,date_updated,csharp_downloads,nodejs_downloads,php_downloads,python_downloads,ruby_downloads\n"
        );
    }

    #[test]
    fn test_rows_follow_header() {
        let records = vec![fixed_snapshot(1, "sendgrid-python"), fixed_snapshot(2, "sendgrid-ruby")];

        let data = String::from_utf8(render_csv(&records).unwrap()).unwrap();
        let lines: Vec<&str> = data.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RecordKind::GithubData.csv_header());
        assert_eq!(
            lines[1],
            "1,2024-03-01 12:30:00,sendgrid-python,0,0,0,0,0,0,0,42,0"
        );
        assert!(data.ends_with("0\n"));
        assert!(!data.ends_with("\n\n"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let records = vec![fixed_snapshot(7, "org/repo,fork")];
        let data = String::from_utf8(render_csv(&records).unwrap()).unwrap();
        assert!(data.contains(",\"org/repo,fork\","));
    }

    #[test]
    fn test_export_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("csv");

        export_records(&target, &[fixed_snapshot(1, "a"), fixed_snapshot(2, "b")]).unwrap();
        let path = export_records(&target, &[fixed_snapshot(3, "c")]).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains(",c,"));
        assert!(!target.join("github_data.csv.tmp").exists());
    }

    #[test]
    fn test_unwritable_directory_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the export directory should be
        let blocker = dir.path().join("csv");
        fs::write(&blocker, b"not a directory").unwrap();

        let records: Vec<SourceControlSnapshot> = vec![];
        let err = export_records(&blocker, &records).unwrap_err();

        match err {
            MetricsError::Export { table, .. } => assert_eq!(table, "github_data"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(&blocker).unwrap(), b"not a directory");
    }

    #[test]
    fn test_embedded_newline_stays_one_record() {
        let records = vec![
            fixed_snapshot(1, "plain"),
            fixed_snapshot(2, "r,\"x\"\nnl"),
        ];
        let data = render_csv(&records).unwrap();

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), records.len());
        assert_eq!(&rows[1][2], "r,\"x\"\nnl");
        assert!(String::from_utf8(data).unwrap().contains("\"r,\"\"x\"\"\nnl\""));
    }

    #[test]
    fn test_failed_rename_keeps_target_and_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory occupies the target path so the rename fails
        let target = dir.path().join("github_data.csv");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"untouched").unwrap();

        let err = export_records(dir.path(), &[fixed_snapshot(1, "a")]).unwrap_err();

        match err {
            MetricsError::Export { table, path, .. } => {
                assert_eq!(table, "github_data");
                assert_eq!(path, target);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("github_data.csv.tmp").exists());
        assert!(target.is_dir());
        assert_eq!(fs::read(target.join("keep.txt")).unwrap(), b"untouched");
    }
}
