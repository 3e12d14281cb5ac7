use anyhow::Result;
use clap::Args;
use library_metrics::database::redact_url;
use library_metrics::{MetricsConfig, OutputFormat};

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also show the config file location
    #[clap(short, long)]
    pub verbose: bool,
}

pub fn run(config: &MetricsConfig, args: ConfigArgs, output_format: OutputFormat) -> Result<()> {
    let ConfigArgs { verbose } = args;

    if output_format.is_json() {
        let mut redacted = config.clone();
        redacted.database_url = redact_url(&config.database_url);
        let output = match output_format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&redacted)?,
            _ => serde_json::to_string(&redacted)?,
        };
        println!("{}", output);
        return Ok(());
    }

    if verbose {
        println!("Config File:        {}", MetricsConfig::config_file_path());
    }
    println!("{}", config.summary());
    Ok(())
}
