//! Service layer that turns a configuration into a written report.
//!
//! `ReportQuerier` is the main entry point for one analysis run. It:
//! 1. Builds the pull request filter from the configuration.
//! 2. Walks the paginated GitHub collection up to the configured page limit.
//! 3. Derives reviewer and merge-time columns from the fetched records.
//! 4. Renders the table and writes the report file.

use crate::config::AppConfig;
use crate::fetcher::{FetchOutcome, PageTransport, PaginatedFetcher};
use crate::github::GitHubClient;
use crate::merge_time::MergeTimeCalculator;
use crate::report::{self, ReportRow};
use crate::types::RepoId;
use chrono::Local;
use std::path::PathBuf;

/// What a run produced, for the caller to report on.
#[derive(Debug)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub pages_requested: u32,
    pub failed_pages: usize,
    pub truncated: bool,
}

pub struct ReportQuerier<T: PageTransport> {
    transport: T,
    repo_id: RepoId,
    config: AppConfig,
}

impl ReportQuerier<GitHubClient> {
    /// Sets up the GitHub client for the configured repository.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let repo_id = config.repo_id();
        let client = GitHubClient::new(
            repo_id.clone(),
            config.access_token.clone(),
            config.github_api_url.as_deref(),
        )?;

        Ok(Self::with_transport(client, repo_id, config))
    }
}

impl<T: PageTransport> ReportQuerier<T> {
    pub fn with_transport(transport: T, repo_id: RepoId, config: &AppConfig) -> Self {
        Self {
            transport,
            repo_id,
            config: config.clone(),
        }
    }

    /// Fetches pull requests and joins them with their derived columns.
    pub async fn fetch_rows(&self) -> (Vec<ReportRow>, FetchOutcome) {
        tracing::info!(
            repo_id = %self.repo_id,
            max_pages = self.config.max_page_count_limit,
            "Fetching pull requests"
        );

        let mut outcome = PaginatedFetcher::new(&self.transport, self.config.max_page_count_limit)
            .fetch_all(&self.config.filter())
            .await;

        if !outcome.failures.is_empty() {
            let pages: Vec<u32> = outcome.failures.iter().map(|failure| failure.page).collect();
            tracing::warn!(
                failed_pages = ?pages,
                records = outcome.records.len(),
                "Continuing with a partial set of pull requests"
            );
        }

        let calculator = MergeTimeCalculator::new(self.config.merge_time_format);
        let records = std::mem::take(&mut outcome.records);
        let rows = report::assemble(&records, &calculator);

        (rows, outcome)
    }

    /// Runs the whole pipeline and writes the report, even when some pages failed.
    pub async fn run(&self) -> anyhow::Result<ReportSummary> {
        let (rows, outcome) = self.fetch_rows().await;

        let generated_at = Local::now();
        let table = report::render(&rows, self.config.export_file_type);
        let file_name = report::report_file_name(
            &self.repo_id,
            self.config.pr_state,
            self.config.export_file_type,
            generated_at,
        );
        let path = report::write_report(
            &self.config.reports_dir,
            &file_name,
            &report::report_page(&table, generated_at),
        )?;

        tracing::info!(
            repo_id = %self.repo_id,
            rows = rows.len(),
            path = %path.display(),
            "Report written"
        );

        Ok(ReportSummary {
            path,
            rows: rows.len(),
            pages_requested: outcome.pages_requested,
            failed_pages: outcome.failures.len(),
            truncated: outcome.truncated,
        })
    }
}
