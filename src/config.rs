use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::export::DEFAULT_CSV_DIR;

/// Prefix for environment overrides, e.g. `LIBRARY_METRICS_DATABASE_URL`
pub const ENV_PREFIX: &str = "LIBRARY_METRICS";

/// Database URL variable of existing deployments, read when
/// `LIBRARY_METRICS_DATABASE_URL` is unset
pub const MYSQL_URL_ENV: &str = "MYSQL_DB_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Generic database URL, normalized before the session is opened
    pub database_url: String,

    /// Directory that receives `<table_name>.csv` exports
    pub csv_dir: String,

    /// Owner of the tracked repositories
    pub github_user: String,

    /// Repository identifiers to collect source-control snapshots for
    pub github_repos: Vec<String>,

    /// Package-registry endpoints to collect download counts from
    pub package_manager_urls: Vec<String>,

    /// Report delivery settings, consumed by the notification sender
    pub to_email: String,
    pub from_email: String,
    pub email_subject: String,
    pub email_body: String,
}

const EMPTY_CONFIG: &str = r#"### library-metrics configuration file

### database connection URL (sqlite:// in memory, sqlite:///relative.db, sqlite:////absolute.db)
### overridden by LIBRARY_METRICS_DATABASE_URL, or else by MYSQL_DB_URL
# database_url = "sqlite:////home/user/.library-metrics/library-metrics.sqlite3"

### directory for CSV exports
# csv_dir = "./csv"

### tracked repositories
# github_user = "sendgrid"
# github_repos = ["sendgrid-python", "sendgrid-nodejs"]

### package registry endpoints
# package_manager_urls = []

### report email
# to_email = ""
# from_email = ""
# email_subject = ""
# email_body = ""
"#;

fn data_dir() -> String {
    let home_dir = dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/.library-metrics", home_dir.trim_end_matches('/'))
}

/// `sqlite:///` followed by the path; absolute paths yield the four-slash form
fn sqlite_url(path: &str) -> String {
    format!("sqlite:///{}", path)
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            database_url: sqlite_url(&format!("{}/library-metrics.sqlite3", data_dir())),
            csv_dir: DEFAULT_CSV_DIR.to_string(),
            github_user: String::new(),
            github_repos: vec![],
            package_manager_urls: vec![],
            to_email: String::new(),
            from_email: String::new(),
            email_subject: String::new(),
            email_body: String::new(),
        }
    }
}

impl MetricsConfig {
    /// Function to create and initialize a new configuration
    ///
    /// Reads the TOML file at `path` (or the default location, which is
    /// created with a commented template when missing), then applies
    /// `LIBRARY_METRICS_*` environment overrides. `MYSQL_DB_URL` supplies the
    /// database URL when no prefixed override does. A `.env` file in the
    /// working directory is loaded first if present.
    pub fn new(path: &Option<String>) -> Result<MetricsConfig> {
        dotenvy::dotenv().ok();

        let config_path = match path {
            Some(p) => p.clone(),
            None => {
                let dir = data_dir();
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create directory {}: {}", dir, e))?;
                Self::config_file_path()
            }
        };

        if !Path::new(config_path.as_str()).exists() {
            std::fs::write(config_path.as_str(), EMPTY_CONFIG)
                .map_err(|e| anyhow!("Unable to create config file {}: {}", config_path, e))?;
        }

        let builder = Config::builder()
            .add_source(File::new(config_path.as_str(), FileFormat::Toml))
            .add_source(Self::environment());

        let mut config = Self::build(builder)?;
        config.apply_mysql_url(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_mysql_url(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if lookup(&format!("{}_DATABASE_URL", ENV_PREFIX)).is_some() {
            return;
        }
        if let Some(url) = lookup(MYSQL_URL_ENV).filter(|u| !u.is_empty()) {
            self.database_url = url;
        }
    }

    /// Build a configuration from TOML text, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<MetricsConfig> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn environment() -> Environment {
        // E.g., `LIBRARY_METRICS_GITHUB_REPOS=a,b` sets two tracked repositories
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("github_repos")
            .with_list_parse_key("package_manager_urls")
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<MetricsConfig> {
        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        settings
            .try_deserialize::<MetricsConfig>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        format!("{}/library-metrics.toml", data_dir())
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = [
            format!(
                "Database URL:       {}",
                crate::database::redact_url(&self.database_url)
            ),
            format!("CSV Directory:      {}", self.csv_dir),
            format!("GitHub User:        {}", self.github_user),
            format!("GitHub Repos:       {}", self.github_repos.join(", ")),
            format!("Registry URLs:      {}", self.package_manager_urls.len()),
            format!("Report Recipient:   {}", self.to_email),
        ];

        lines.join("\n")
    }
}
