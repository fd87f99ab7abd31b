//! Merge latency for merged pull requests.
//!
//! The duration between creation and closure is rendered either as a compact
//! `1d 3h 12m` breakdown or as a whole-day count, depending on the
//! [`MergeTimeFormat`] the calculator was built with.

use crate::types::{PullRequestRecord, PullRequestState};
use chrono::Duration;
use serde::Deserialize;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeTimeFormat {
    #[default]
    Hours,
    Days,
}

#[derive(Clone, Copy, Debug)]
pub struct MergeTimeCalculator {
    format: MergeTimeFormat,
}

impl MergeTimeCalculator {
    pub fn new(format: MergeTimeFormat) -> Self {
        Self { format }
    }

    /// Formatted merge time for one record.
    ///
    /// Anything that is not a merged pull request with both timestamps yields
    /// an empty string.
    pub fn calculate(&self, record: &PullRequestRecord) -> String {
        if record.state != PullRequestState::Merged {
            return String::new();
        }

        let Some(closed_at) = record.closed_at else {
            tracing::debug!(number = record.number, "Merged pull request has no closedAt");
            return String::new();
        };

        let merge_time = closed_at - record.created_at;
        if merge_time < Duration::zero() {
            tracing::debug!(number = record.number, "Pull request closed before it was created");
            return String::new();
        }

        self.format_duration(merge_time)
    }

    /// One formatted value per record, in input order.
    pub fn calculate_all(&self, records: &[PullRequestRecord]) -> Vec<String> {
        records.iter().map(|record| self.calculate(record)).collect()
    }

    pub fn format_duration(&self, merge_time: Duration) -> String {
        match self.format {
            MergeTimeFormat::Days => format_days(merge_time),
            MergeTimeFormat::Hours => format_hours(merge_time),
        }
    }
}

fn format_days(merge_time: Duration) -> String {
    match merge_time.num_days() {
        0 => "same day".to_string(),
        1 => "1 day".to_string(),
        days => format!("{} days", days),
    }
}

fn format_hours(merge_time: Duration) -> String {
    let total_seconds = merge_time.num_seconds();

    let days = total_seconds / SECONDS_PER_DAY;
    let hours = (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;

    let mut formatted = String::new();
    if days > 0 {
        formatted.push_str(&format!("{}d ", days));
    }
    if hours > 0 {
        formatted.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        formatted.push_str(&format!("{}m ", minutes));
    }
    // Seconds only matter when nothing larger is shown.
    if total_seconds < SECONDS_PER_MINUTE {
        formatted.push_str(&format!("{}s", total_seconds));
    }

    formatted.trim_end().to_string()
}
