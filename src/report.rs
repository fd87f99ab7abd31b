//! Report assembly and rendering.
//!
//! Records and their derived columns are joined into [`ReportRow`]s, rendered
//! as CSV, Markdown or HTML, and written to a timestamped file.

use crate::merge_time::MergeTimeCalculator;
use crate::reviewers;
use crate::types::{PullRequestRecord, PullRequestState, RepoId};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const FILE_NAME_PREFIX: &str = "pr-analysis-generated-report";

pub const COLUMNS: [&str; 12] = [
    "PR #",
    "Title",
    "State",
    "Code Author",
    "Created At",
    "Closed At",
    "File Changes",
    "# Of Review Requests",
    "Code Reviewers",
    "Approved By",
    "Merged By",
    "Merge Time",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "md")]
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }
}

/// One line of the report, with every value already formatted for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    pub author: String,
    pub created_at: String,
    pub closed_at: String,
    pub changed_files: u64,
    pub review_requests: u64,
    pub code_reviewers: String,
    pub approved_by: String,
    pub merged_by: String,
    pub merge_time: String,
}

impl ReportRow {
    fn cells(&self) -> [String; 12] {
        [
            self.number.to_string(),
            self.title.clone(),
            self.state.to_string(),
            self.author.clone(),
            self.created_at.clone(),
            self.closed_at.clone(),
            self.changed_files.to_string(),
            self.review_requests.to_string(),
            self.code_reviewers.clone(),
            self.approved_by.clone(),
            self.merged_by.clone(),
            self.merge_time.clone(),
        ]
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Joins each record with its derived columns, keeping input order.
pub fn assemble(records: &[PullRequestRecord], calculator: &MergeTimeCalculator) -> Vec<ReportRow> {
    let merge_times = calculator.calculate_all(records);

    records
        .iter()
        .zip(merge_times)
        .map(|(record, merge_time)| ReportRow {
            number: record.number,
            title: record.title.clone(),
            state: record.state,
            author: record.author.clone(),
            created_at: format_timestamp(&record.created_at),
            closed_at: record
                .closed_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            changed_files: record.changed_files,
            review_requests: record.review_requests,
            code_reviewers: reviewers::code_reviewers(record),
            approved_by: reviewers::approved_by(record),
            merged_by: record.merged_by.clone().unwrap_or_default(),
            merge_time,
        })
        .collect()
}

pub fn render(rows: &[ReportRow], format: ExportFormat) -> String {
    match format {
        ExportFormat::Csv => render_csv(rows),
        ExportFormat::Markdown => render_markdown(rows),
        ExportFormat::Html => render_html(rows),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_csv(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    let header: Vec<String> = COLUMNS.iter().map(|column| csv_field(column)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|cell| csv_field(cell)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    out
}

fn markdown_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

fn render_markdown(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        COLUMNS.iter().map(|_| ":---").collect::<Vec<_>>().join("|")
    ));

    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|cell| markdown_cell(cell)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out
}

fn html_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_html(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    out.push_str("<table border=\"1\" class=\"dataframe\" style=\"font-family: sans-serif;\">\n");
    out.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for column in COLUMNS {
        out.push_str(&format!("      <th>{}</th>\n", html_escape(column)));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in rows {
        out.push_str("    <tr>\n");
        for cell in row.cells() {
            out.push_str(&format!("      <td>{}</td>\n", html_escape(&cell)));
        }
        out.push_str("    </tr>\n");
    }

    out.push_str("  </tbody>\n</table>");
    out
}

/// The full file contents: a generation timestamp followed by the table.
pub fn report_page(table: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "Report generated on {}\n\n{}",
        generated_at.format(DISPLAY_DATE_FORMAT),
        table
    )
}

pub fn report_file_name(
    repo_id: &RepoId,
    state: Option<PullRequestState>,
    format: ExportFormat,
    generated_at: DateTime<Local>,
) -> String {
    let mut file_name = format!(
        "{}-{}-{}-{}",
        FILE_NAME_PREFIX,
        repo_id.owner,
        repo_id.repo,
        generated_at.format(FILE_DATE_FORMAT)
    );
    if let Some(state) = state {
        file_name.push_str(&format!("-{}", state));
    }
    file_name.push('.');
    file_name.push_str(format.extension());
    file_name
}

/// Writes `contents` to `dir/file_name`, creating `dir` if needed.
pub fn write_report(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create reports directory {}", dir.display()))?;

    let path = dir.join(file_name);
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}
