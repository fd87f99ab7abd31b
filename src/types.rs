use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Lifecycle state of a pull request as reported by GitHub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "OPEN",
            PullRequestState::Closed => "CLOSED",
            PullRequestState::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single review left on a pull request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewEdge {
    pub reviewer: String,
    pub approved: bool,
}

/// A pull request snapshot taken at fetch time.
#[derive(Clone, Debug, PartialEq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// `None` while the pull request is open.
    pub closed_at: Option<DateTime<Utc>>,
    pub changed_files: u64,
    pub review_requests: u64,
    pub reviews: Vec<ReviewEdge>,
    pub merged_by: Option<String>,
}

impl PullRequestRecord {
    pub fn approved_reviews(&self) -> impl Iterator<Item = &ReviewEdge> {
        self.reviews.iter().filter(|edge| edge.approved)
    }
}
