use anyhow::Result;
use library_metrics::database::TIMESTAMP_FORMAT;
use library_metrics::{
    MetricsStore, OutputFormat, PackageDownloadSnapshot, Record, RecordKind, SourceControlSnapshot,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TableStatus {
    table: String,
    rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,
}

fn last_updated<R: Record>(store: &MetricsStore) -> Result<Option<String>> {
    Ok(store
        .latest::<R>()?
        .map(|r| r.date_updated().format(TIMESTAMP_FORMAT).to_string()))
}

pub fn run_init(store: &MetricsStore) -> Result<()> {
    println!(
        "Database {} ready (schema v{})",
        store.url(),
        store.schema_version()?
    );
    Ok(())
}

pub fn run(store: &MetricsStore, output_format: OutputFormat) -> Result<()> {
    let mut tables = Vec::new();
    for kind in RecordKind::ALL {
        let last_updated = match kind {
            RecordKind::GithubData => last_updated::<SourceControlSnapshot>(store)?,
            RecordKind::PackageManagerData => last_updated::<PackageDownloadSnapshot>(store)?,
        };
        tables.push(TableStatus {
            table: kind.to_string(),
            rows: store.count(kind)?,
            last_updated,
        });
    }

    if output_format.is_json() {
        let output = match output_format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&tables)?,
            _ => serde_json::to_string(&tables)?,
        };
        println!("{}", output);
        return Ok(());
    }

    println!("Database:       {}", store.url());
    println!("Schema Version: {}", store.schema_version()?);
    for t in &tables {
        println!(
            "{:<22} {:>8} rows   last updated: {}",
            t.table,
            t.rows,
            t.last_updated.as_deref().unwrap_or("never")
        );
    }
    Ok(())
}
