//! Collection run
//!
//! The source-control, package-registry and mail clients live outside this
//! crate. They plug in through [`SourceControlSource`],
//! [`PackageRegistrySource`] and [`ReportSender`], and [`run_collection`]
//! drives one batch: fetch, append to the store, then send the report.

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::config::MetricsConfig;
use crate::database::{MetricsStore, PackageDownloadSnapshot, SourceControlSnapshot};

/// Produces a source-control snapshot for one repository
pub trait SourceControlSource {
    fn fetch(&self, user: &str, repo: &str) -> Result<SourceControlSnapshot>;
}

/// Produces download counts for the configured registry endpoints
pub trait PackageRegistrySource {
    fn fetch(&self, urls: &[String]) -> Result<PackageDownloadSnapshot>;
}

/// Delivers the run report, returning the transport's status code
pub trait ReportSender {
    fn send(&self, to: &str, from: &str, subject: &str, body: &str) -> Result<u16>;
}

/// Outcome of one collection run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Ids assigned to the stored source-control snapshots, in repo order
    pub github_ids: Vec<i64>,
    /// Id of the stored package snapshot, if one was collected
    pub package_id: Option<i64>,
    /// Status code returned by the report sender, if a report was sent
    pub report_status: Option<u16>,
    /// One message per collaborator failure that was skipped
    pub failures: Vec<String>,
}

/// Fetch and store one snapshot per configured repository plus one package
/// snapshot
///
/// A report goes to `to_email` once the snapshots are stored; no recipient
/// means no report. A collaborator failure skips that step and is recorded in
/// the summary. A store failure aborts the run before any report is sent.
pub fn run_collection(
    store: &MetricsStore,
    config: &MetricsConfig,
    scm: &dyn SourceControlSource,
    registry: &dyn PackageRegistrySource,
    sender: &dyn ReportSender,
) -> Result<CollectionSummary> {
    let mut summary = CollectionSummary::default();

    for repo in &config.github_repos {
        let snapshot = match scm.fetch(&config.github_user, repo) {
            Ok(s) => s,
            Err(e) => {
                warn!("skipping {}/{}: {}", config.github_user, repo, e);
                summary
                    .failures
                    .push(format!("{}/{}: {}", config.github_user, repo, e));
                continue;
            }
        };
        let stored = store
            .add_data(snapshot)
            .map_err(|e| anyhow!("Failed to store snapshot for {}: {}", repo, e))?;
        summary.github_ids.extend(stored.id);
    }

    if !config.package_manager_urls.is_empty() {
        match registry.fetch(&config.package_manager_urls) {
            Ok(snapshot) => {
                let stored = store
                    .add_data(snapshot)
                    .map_err(|e| anyhow!("Failed to store package downloads: {}", e))?;
                summary.package_id = stored.id;
            }
            Err(e) => {
                warn!("skipping package downloads: {}", e);
                summary.failures.push(format!("package downloads: {}", e));
            }
        }
    }

    if !config.to_email.is_empty() {
        match sender.send(
            &config.to_email,
            &config.from_email,
            &config.email_subject,
            &config.email_body,
        ) {
            Ok(status) => summary.report_status = Some(status),
            Err(e) => {
                warn!("report to {} not sent: {}", config.to_email, e);
                summary.failures.push(format!("report: {}", e));
            }
        }
    }

    info!(
        "collection finished: {} repo snapshot(s), package snapshot {}, {} failure(s)",
        summary.github_ids.len(),
        if summary.package_id.is_some() {
            "stored"
        } else {
            "skipped"
        },
        summary.failures.len()
    );
    Ok(summary)
}
