//! Builds the filter arguments of the pull request connection query.

use crate::types::PullRequestState;

/// User-supplied inclusion rules for the pull requests to fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// `None` means all states.
    pub state: Option<PullRequestState>,
    /// Kept in the order given; empty means no label restriction.
    pub labels: Vec<String>,
}

impl FilterConfig {
    pub fn new(state: Option<PullRequestState>, labels: Vec<String>) -> Self {
        Self { state, labels }
    }

    /// The full argument fragment spliced into the `pullRequests(...)` call.
    pub fn fragment(&self) -> String {
        format!(
            "{}{}",
            state_filter_fragment(self.state),
            labels_filter_fragment(&self.labels)
        )
    }
}

pub fn state_filter_fragment(state: Option<PullRequestState>) -> String {
    match state {
        Some(state) => format!("states: {}, ", state),
        None => String::new(),
    }
}

/// Labels are included literally; quoting inside a label is left to the caller.
pub fn labels_filter_fragment<S: AsRef<str>>(labels: &[S]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let quoted: Vec<String> = labels
        .iter()
        .map(|label| format!("\"{}\"", label.as_ref()))
        .collect();

    format!("labels: [{}],", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_fragment_empty() {
        let labels: Vec<String> = vec![];
        assert_eq!(labels_filter_fragment(&labels), "");
    }

    #[test]
    fn test_labels_fragment_single() {
        assert_eq!(labels_filter_fragment(&["label1"]), r#"labels: ["label1"],"#);
    }

    #[test]
    fn test_labels_fragment_keeps_input_order() {
        assert_eq!(
            labels_filter_fragment(&["label1", "label2", "label3"]),
            r#"labels: ["label1", "label2", "label3"],"#
        );
        assert_eq!(
            labels_filter_fragment(&["zeta", "alpha"]),
            r#"labels: ["zeta", "alpha"],"#
        );
    }

    #[test]
    fn test_state_fragment() {
        assert_eq!(state_filter_fragment(None), "");
        assert_eq!(
            state_filter_fragment(Some(PullRequestState::Merged)),
            "states: MERGED, "
        );
    }

    #[test]
    fn test_fragment_combines_state_and_labels() {
        let filter = FilterConfig::new(Some(PullRequestState::Open), vec!["bug".to_string()]);
        assert_eq!(filter.fragment(), r#"states: OPEN, labels: ["bug"],"#);

        assert_eq!(FilterConfig::default().fragment(), "");
    }
}
