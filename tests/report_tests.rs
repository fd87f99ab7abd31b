use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pr_analysis::fetcher::{FetchError, FetchPage, PageTransport};
use pr_analysis::merge_time::MergeTimeFormat;
use pr_analysis::report::ExportFormat;
use pr_analysis::types::{PullRequestRecord, PullRequestState, RepoId, ReviewEdge};
use pr_analysis::{AppConfig, ReportQuerier};
use std::path::Path;
use std::sync::Mutex;

fn config(reports_dir: &Path, export_file_type: ExportFormat) -> AppConfig {
    AppConfig {
        repo_owner: "octo".to_string(),
        repo_name: "widgets".to_string(),
        access_token: None,
        github_api_url: None,
        pr_state: None,
        pr_labels: vec![],
        max_page_count_limit: 5,
        export_file_type,
        merge_time_format: MergeTimeFormat::Days,
        reports_dir: reports_dir.to_path_buf(),
    }
}

fn repo_id() -> RepoId {
    RepoId {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
    }
}

fn record(
    number: u64,
    state: PullRequestState,
    merged_after_days: Option<i64>,
) -> PullRequestRecord {
    let created_at = Utc.with_ymd_and_hms(2023, 7, 1, 10, 0, 0).unwrap();
    PullRequestRecord {
        number,
        title: format!("PR {}", number),
        state,
        author: "author-1".to_string(),
        created_at,
        closed_at: merged_after_days.map(|days| created_at + chrono::Duration::days(days)),
        changed_files: 3,
        review_requests: 1,
        reviews: vec![
            ReviewEdge {
                reviewer: "reviewer-b".to_string(),
                approved: true,
            },
            ReviewEdge {
                reviewer: "reviewer-a".to_string(),
                approved: false,
            },
            ReviewEdge {
                reviewer: "reviewer-b".to_string(),
                approved: false,
            },
        ],
        merged_by: merged_after_days.map(|_| "maintainer".to_string()),
    }
}

/// Serves two good pages around a broken one.
struct ScriptedTransport {
    calls: Mutex<u32>,
}

#[async_trait]
impl PageTransport for ScriptedTransport {
    async fn fetch_page(
        &self,
        _filter: &str,
        _cursor: Option<&str>,
        _page_size: u32,
    ) -> Result<FetchPage, FetchError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;

        match *calls {
            1 => Ok(FetchPage {
                records: vec![
                    record(3, PullRequestState::Merged, Some(5)),
                    record(2, PullRequestState::Open, None),
                ],
                end_cursor: Some("page-1".to_string()),
                has_next_page: true,
            }),
            2 => Err(FetchError::Shape("missing data.repository".to_string())),
            _ => Ok(FetchPage {
                records: vec![record(1, PullRequestState::Merged, Some(36))],
                end_cursor: None,
                has_next_page: false,
            }),
        }
    }
}

#[tokio::test]
async fn test_run_writes_partial_report() {
    let temp = tempfile::tempdir().unwrap();
    let config = config(temp.path(), ExportFormat::Csv);
    let transport = ScriptedTransport {
        calls: Mutex::new(0),
    };

    let querier = ReportQuerier::with_transport(transport, repo_id(), &config);
    let summary = querier.run().await.expect("report should be written");

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.pages_requested, 3);
    assert_eq!(summary.failed_pages, 1);
    assert!(!summary.truncated);

    let file_name = summary.path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("pr-analysis-generated-report-octo-widgets-"));
    assert!(file_name.ends_with(".csv"));

    let contents = std::fs::read_to_string(&summary.path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert!(lines[0].starts_with("Report generated on "));
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("PR #,Title,State"));
    assert_eq!(lines.len(), 6);
    assert!(lines[3].starts_with("3,PR 3,MERGED,author-1,"));
    assert!(lines[3].ends_with(",\"reviewer-a, reviewer-b\",reviewer-b,maintainer,5 days"));
    assert!(lines[4].ends_with(",\"reviewer-a, reviewer-b\",reviewer-b,,"));
    assert!(lines[5].ends_with(",maintainer,36 days"));
}

#[tokio::test]
async fn test_fetch_rows_stops_at_page_limit() {
    struct EndlessTransport;

    #[async_trait]
    impl PageTransport for EndlessTransport {
        async fn fetch_page(
            &self,
            _filter: &str,
            cursor: Option<&str>,
            _page_size: u32,
        ) -> Result<FetchPage, FetchError> {
            let next = cursor.map(|c| c.len() as u64).unwrap_or(0) + 1;
            Ok(FetchPage {
                records: vec![record(next, PullRequestState::Closed, None)],
                end_cursor: Some("x".repeat(next as usize)),
                has_next_page: true,
            })
        }
    }

    let temp = tempfile::tempdir().unwrap();
    let mut config = config(temp.path(), ExportFormat::Markdown);
    config.max_page_count_limit = 5;

    let querier = ReportQuerier::with_transport(EndlessTransport, repo_id(), &config);
    let (rows, outcome) = querier.fetch_rows().await;

    assert_eq!(outcome.pages_requested, 5);
    assert!(outcome.truncated);
    assert_eq!(
        rows.iter().map(|row| row.number).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert!(rows.iter().all(|row| row.merge_time.is_empty()));
}
