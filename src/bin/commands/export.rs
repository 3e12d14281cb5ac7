use anyhow::Result;
use clap::Args;
use library_metrics::{MetricsStore, RecordKind};
use std::path::PathBuf;

/// Arguments for the Export command
#[derive(Args)]
pub struct ExportArgs {
    /// Table to export; all tables when omitted
    #[clap(value_enum)]
    pub table: Option<RecordKind>,

    /// Destination directory, overrides the configured csv_dir
    #[clap(short, long)]
    pub dir: Option<PathBuf>,
}

pub fn run(store: &MetricsStore, args: ExportArgs) -> Result<()> {
    let ExportArgs { table, dir } = args;

    let kinds: Vec<RecordKind> = match table {
        Some(kind) => vec![kind],
        None => RecordKind::ALL.to_vec(),
    };

    for kind in kinds {
        let path = match &dir {
            Some(d) => store.export_table_to_csv_in(kind, d)?,
            None => store.export_table_to_csv(kind)?,
        };
        println!("Exported {} to {}", kind, path.display());
    }

    Ok(())
}
