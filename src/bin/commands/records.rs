use anyhow::{anyhow, Result};
use clap::Args;
use library_metrics::output::format_records;
use library_metrics::{
    MetricsStore, OutputFormat, PackageDownloadSnapshot, RecordKind, SourceControlSnapshot,
};

/// Arguments for the List command
#[derive(Args)]
pub struct ListArgs {
    /// Table to list: github_data or package_manager_data
    #[clap(value_enum)]
    pub table: RecordKind,

    /// Only show the most recent N snapshots
    #[clap(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the Delete command
#[derive(Args)]
pub struct DeleteArgs {
    /// Table to delete from: github_data or package_manager_data
    #[clap(value_enum)]
    pub table: RecordKind,

    /// Id of the snapshot to delete
    pub id: i64,
}

fn tail<T>(mut rows: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(n) = limit {
        let skip = rows.len().saturating_sub(n);
        rows.drain(..skip);
    }
    rows
}

pub fn run_list(store: &MetricsStore, args: ListArgs, output_format: OutputFormat) -> Result<()> {
    let ListArgs { table, limit } = args;

    let output = match table {
        RecordKind::GithubData => {
            let rows = tail(store.get_data::<SourceControlSnapshot>()?, limit);
            format_records(&rows, output_format)?
        }
        RecordKind::PackageManagerData => {
            let rows = tail(store.get_data::<PackageDownloadSnapshot>()?, limit);
            format_records(&rows, output_format)?
        }
    };

    println!("{}", output);
    Ok(())
}

pub fn run_delete(store: &MetricsStore, args: DeleteArgs) -> Result<()> {
    let DeleteArgs { table, id } = args;

    if store.delete_data(id, table)? {
        println!("Deleted {} from {}", id, table);
        Ok(())
    } else {
        Err(anyhow!("No row with id {} in {}", id, table))
    }
}
