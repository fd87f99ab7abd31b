//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a `.env`
//! file). They select the repository to analyze, which pull requests to
//! include, how many pages to fetch, and how the report is rendered.

use crate::fetcher::DEFAULT_MAX_PAGES;
use crate::filter::FilterConfig;
use crate::merge_time::MergeTimeFormat;
use crate::report::ExportFormat;
use crate::types::{PullRequestState, RepoId};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Owner of the repository to analyze (e.g., "rust-lang").
    pub repo_owner: String,

    /// Name of the repository to analyze (e.g., "rust").
    pub repo_name: String,

    /// GitHub token, passed through to the API client as-is.
    pub access_token: Option<String>,

    /// Base URI of the GitHub API, for GitHub Enterprise installations.
    pub github_api_url: Option<String>,

    /// Only include pull requests in this state. Unset, empty or `ALL` means every state.
    #[serde(default, deserialize_with = "deserialize_state")]
    pub pr_state: Option<PullRequestState>,

    /// Only include pull requests carrying these labels.
    /// Expected format: comma-separated string, e.g. "bug,needs review".
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub pr_labels: Vec<String>,

    /// Hard limit on the number of pages requested from the GitHub API.
    #[serde(default = "default_max_page_count_limit")]
    pub max_page_count_limit: u32,

    #[serde(default)]
    pub export_file_type: ExportFormat,

    #[serde(default)]
    pub merge_time_format: MergeTimeFormat,

    /// Directory the report is written to.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

fn default_max_page_count_limit() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("generated-reports")
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn repo_id(&self) -> RepoId {
        RepoId {
            owner: self.repo_owner.clone(),
            repo: self.repo_name.clone(),
        }
    }

    pub fn filter(&self) -> FilterConfig {
        FilterConfig::new(self.pr_state, self.pr_labels.clone())
    }
}

fn deserialize_state<'de, D>(deserializer: D) -> Result<Option<PullRequestState>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_state(&s).map_err(serde::de::Error::custom)
}

fn parse_state(s: &str) -> Result<Option<PullRequestState>, String> {
    match s.trim().to_uppercase().as_str() {
        "" | "ALL" => Ok(None),
        "OPEN" => Ok(Some(PullRequestState::Open)),
        "CLOSED" => Ok(Some(PullRequestState::Closed)),
        "MERGED" => Ok(Some(PullRequestState::Merged)),
        other => Err(format!(
            "unknown pull request state '{}', expected MERGED, OPEN, CLOSED or ALL",
            other
        )),
    }
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(parse_labels(&s))
}

fn parse_labels(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 10] = [
        "REPO_OWNER",
        "REPO_NAME",
        "ACCESS_TOKEN",
        "GITHUB_API_URL",
        "PR_STATE",
        "PR_LABELS",
        "MAX_PAGE_COUNT_LIMIT",
        "EXPORT_FILE_TYPE",
        "MERGE_TIME_FORMAT",
        "REPORTS_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        env::set_var("REPO_OWNER", "octo");
        env::set_var("REPO_NAME", "widgets");
        env::set_var("ACCESS_TOKEN", "secret");
        env::set_var("PR_STATE", "merged");
        env::set_var("PR_LABELS", "bug, needs review,,");
        env::set_var("MAX_PAGE_COUNT_LIMIT", "2");
        env::set_var("EXPORT_FILE_TYPE", "md");
        env::set_var("MERGE_TIME_FORMAT", "days");
        env::set_var("REPORTS_DIR", "out");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.repo_id().to_string(), "octo/widgets");
        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(config.pr_state, Some(PullRequestState::Merged));
        assert_eq!(config.pr_labels, vec!["bug", "needs review"]);
        assert_eq!(config.max_page_count_limit, 2);
        assert_eq!(config.export_file_type, ExportFormat::Markdown);
        assert_eq!(config.merge_time_format, MergeTimeFormat::Days);
        assert_eq!(config.reports_dir, PathBuf::from("out"));
        assert_eq!(
            config.filter().fragment(),
            r#"states: MERGED, labels: ["bug", "needs review"],"#
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        env::set_var("REPO_OWNER", "octo");
        env::set_var("REPO_NAME", "widgets");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert!(config.access_token.is_none());
        assert!(config.github_api_url.is_none());
        assert!(config.pr_state.is_none());
        assert!(config.pr_labels.is_empty());
        assert_eq!(config.max_page_count_limit, DEFAULT_MAX_PAGES);
        assert_eq!(config.export_file_type, ExportFormat::Csv);
        assert_eq!(config.merge_time_format, MergeTimeFormat::Hours);
        assert_eq!(config.reports_dir, PathBuf::from("generated-reports"));
        assert_eq!(config.filter(), FilterConfig::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_missing_vars() {
        clear_env();
        env::set_var("REPO_NAME", "widgets");
        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_rejects_unknown_state() {
        clear_env();
        env::set_var("REPO_OWNER", "octo");
        env::set_var("REPO_NAME", "widgets");
        env::set_var("PR_STATE", "DRAFT");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("ALL"), Ok(None));
        assert_eq!(parse_state(" "), Ok(None));
        assert_eq!(parse_state("Closed"), Ok(Some(PullRequestState::Closed)));
        assert!(parse_state("draft").is_err());
    }

    #[test]
    fn test_parse_labels() {
        assert!(parse_labels("").is_empty());
        assert_eq!(parse_labels("b,a"), vec!["b", "a"]);
    }
}
