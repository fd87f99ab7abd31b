use crate::types::{PullRequestRecord, ReviewEdge};
use std::collections::BTreeSet;

/// Collapses review edges into a comma-separated list of distinct reviewers,
/// sorted ascending. A reviewer who reviewed several times appears once.
pub fn aggregate<'a, I>(edges: I) -> String
where
    I: IntoIterator<Item = &'a ReviewEdge>,
{
    let reviewers: BTreeSet<&str> = edges
        .into_iter()
        .map(|edge| edge.reviewer.as_str())
        .collect();

    reviewers.into_iter().collect::<Vec<_>>().join(", ")
}

/// The "Code Reviewers" column: everyone who left a review.
pub fn code_reviewers(record: &PullRequestRecord) -> String {
    aggregate(&record.reviews)
}

/// The "Approved By" column: only reviewers whose review was an approval.
pub fn approved_by(record: &PullRequestRecord) -> String {
    aggregate(record.approved_reviews())
}
