#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::{Parser, Subcommand};
use library_metrics::*;
use tracing::Level;

mod commands;

use commands::config::ConfigArgs;
use commands::export::ExportArgs;
use commands::records::{DeleteArgs, ListArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.library-metrics/library-metrics.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// database URL, overrides the configured one
    #[clap(long, global = true)]
    database_url: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables if they do not exist
    Init,

    /// Show row counts and the latest capture time per table
    Status,

    /// List stored snapshots of one table
    List(ListArgs),

    /// Delete one snapshot by id
    Delete(DeleteArgs),

    /// Export tables to CSV files
    Export(ExportArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let mut config = match MetricsConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    let result = match cli.command {
        Commands::Config(args) => commands::config::run(&config, args, cli.format),
        command => {
            let store = match MetricsStore::open(&config.database_url) {
                Ok(store) => store.with_csv_dir(&config.csv_dir),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    std::process::exit(1);
                }
            };
            match command {
                Commands::Init => commands::status::run_init(&store),
                Commands::Status => commands::status::run(&store, cli.format),
                Commands::List(args) => commands::records::run_list(&store, args, cli.format),
                Commands::Delete(args) => commands::records::run_delete(&store, args),
                Commands::Export(args) => commands::export::run(&store, args),
                Commands::Config(_) => Ok(()),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
