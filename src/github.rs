use crate::fetcher::{FetchError, FetchPage, PageTransport};
use crate::types::{PullRequestRecord, PullRequestState, RepoId, ReviewEdge};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;

/// Login GitHub shows for accounts that have been deleted.
const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestConnection {
    page_info: PageInfo,
    /// Entries the token cannot see come back as `null` alongside an error.
    nodes: Vec<Option<PullRequestNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct ReviewConnection {
    nodes: Vec<ReviewNode>,
}

#[derive(Debug, Deserialize)]
struct ReviewNode {
    author: Option<Actor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    title: String,
    state: PullRequestState,
    author: Option<Actor>,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    changed_files: u64,
    timeline_items: TotalCount,
    all_reviews: Option<ReviewConnection>,
    approved_reviews: Option<ReviewConnection>,
    merged_by: Option<Actor>,
}

fn login(actor: Option<Actor>) -> String {
    actor
        .map(|actor| actor.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string())
}

fn review_edges(reviews: Option<ReviewConnection>, approved: bool) -> Vec<ReviewEdge> {
    reviews
        .map(|reviews| reviews.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|review| ReviewEdge {
            reviewer: login(review.author),
            approved,
        })
        .collect()
}

impl From<PullRequestNode> for PullRequestRecord {
    fn from(node: PullRequestNode) -> Self {
        // Approvals come from their own connection so they survive PRs with
        // more reviews than one connection page holds.
        let mut reviews = review_edges(node.all_reviews, false);
        reviews.extend(review_edges(node.approved_reviews, true));

        PullRequestRecord {
            number: node.number,
            title: node.title,
            state: node.state,
            author: login(node.author),
            created_at: node.created_at,
            closed_at: node.closed_at,
            changed_files: node.changed_files,
            review_requests: node.timeline_items.total_count,
            reviews,
            merged_by: node.merged_by.map(|actor| actor.login),
        }
    }
}

/// Builds the GraphQL document for one page of pull requests, newest first.
pub fn build_query(repo_id: &RepoId, filter: &str, cursor: Option<&str>, page_size: u32) -> String {
    let after = cursor
        .map(|cursor| format!(", after: \"{}\"", cursor))
        .unwrap_or_default();

    format!(
        r#"query {{
  repository(owner: "{owner}", name: "{repo}") {{
    pullRequests({filter}first: {page_size}{after}, orderBy: {{ field: CREATED_AT, direction: DESC }}) {{
      pageInfo {{
        endCursor
        hasNextPage
      }}
      nodes {{
        number
        title
        state
        author {{
          login
        }}
        createdAt
        closedAt
        changedFiles
        timelineItems(itemTypes: [REVIEW_REQUESTED_EVENT], first: 100) {{
          totalCount
        }}
        approvedReviews: reviews(first: 100, states: APPROVED) {{
          nodes {{
            author {{
              login
            }}
          }}
        }}
        allReviews: reviews(first: 100) {{
          nodes {{
            author {{
              login
            }}
          }}
        }}
        mergedBy {{
          login
        }}
      }}
    }}
  }}
}}"#,
        owner = repo_id.owner,
        repo = repo_id.repo,
        filter = filter,
        page_size = page_size,
        after = after,
    )
}

/// Turns a raw GraphQL response body into a page of records.
///
/// GraphQL errors that come with usable data are logged and otherwise ignored.
pub fn parse_page(body: serde_json::Value) -> Result<FetchPage, FetchError> {
    let response: GraphQlResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Shape(e.to_string()))?;

    let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();

    let repository = match response.data.and_then(|data| data.repository) {
        Some(repository) => repository,
        None if !messages.is_empty() => return Err(FetchError::GraphQl(messages)),
        None => return Err(FetchError::Shape("missing data.repository".to_string())),
    };

    if !messages.is_empty() {
        tracing::warn!("GitHub returned partial data with errors: {}", messages.join("; "));
    }

    let connection = repository.pull_requests;
    let returned = connection.nodes.len();
    let records: Vec<PullRequestRecord> =
        connection.nodes.into_iter().flatten().map(Into::into).collect();

    if records.len() < returned {
        tracing::warn!(
            dropped = returned - records.len(),
            "Skipped pull requests that came back empty"
        );
    }

    Ok(FetchPage {
        records,
        end_cursor: connection.page_info.end_cursor,
        has_next_page: connection.page_info.has_next_page,
    })
}

pub struct GitHubClient {
    octocrab: Octocrab,
    repo_id: RepoId,
}

impl GitHubClient {
    pub fn new(repo_id: RepoId, token: Option<String>, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            builder = builder.personal_token(token);
        }
        if let Some(base_uri) = base_uri.filter(|uri| !uri.is_empty()) {
            builder = builder.base_uri(base_uri)?;
        }

        Ok(Self {
            octocrab: builder.build()?,
            repo_id,
        })
    }
}

#[async_trait]
impl PageTransport for GitHubClient {
    async fn fetch_page(
        &self,
        filter: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<FetchPage, FetchError> {
        let query = build_query(&self.repo_id, filter, cursor, page_size);
        tracing::debug!(repo_id = %self.repo_id, cursor = ?cursor, "Requesting pull request page");

        let body: serde_json::Value = self
            .octocrab
            .graphql(&serde_json::json!({ "query": query }))
            .await?;

        parse_page(body)
    }
}
