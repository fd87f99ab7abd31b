//! Bounded, cursor-driven retrieval of pull request pages.
//!
//! The fetcher walks a paginated collection one request at a time until the
//! remote side reports no further pages or the page ceiling is reached. A page
//! that fails is logged and recorded but never aborts the run, so callers
//! always get whatever records were gathered.

use crate::filter::FilterConfig;
use crate::types::PullRequestRecord;
use async_trait::async_trait;

/// Records requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Page ceiling used when none is configured.
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// One page of results as returned by the transport.
#[derive(Clone, Debug, Default)]
pub struct FetchPage {
    pub records: Vec<PullRequestRecord>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to GitHub failed: {0}")]
    Transport(#[from] octocrab::Error),

    #[error("GitHub returned errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// The capability of requesting a single page of pull requests.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn fetch_page(
        &self,
        filter: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<FetchPage, FetchError>;
}

#[derive(Debug)]
pub struct PageFailure {
    /// 1-based number of the request that failed.
    pub page: u32,
    pub error: FetchError,
}

/// Everything a fetch run produced.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<PullRequestRecord>,
    pub pages_requested: u32,
    pub failures: Vec<PageFailure>,
    /// Set when the ceiling stopped the loop before the collection was exhausted.
    pub truncated: bool,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        !self.truncated && self.failures.is_empty()
    }
}

pub struct PaginatedFetcher<'a, T: PageTransport + ?Sized> {
    transport: &'a T,
    max_pages: u32,
}

impl<'a, T: PageTransport + ?Sized> PaginatedFetcher<'a, T> {
    pub fn new(transport: &'a T, max_pages: u32) -> Self {
        Self {
            transport,
            max_pages,
        }
    }

    /// Fetches pages until the collection ends or `max_pages` requests were made.
    ///
    /// A failed page still counts toward the ceiling and leaves the cursor
    /// where it was, so the next request retries the same position.
    pub async fn fetch_all(&self, filter: &FilterConfig) -> FetchOutcome {
        let filter = filter.fragment();
        let mut outcome = FetchOutcome::default();
        let mut cursor: Option<String> = None;

        if self.max_pages == 0 {
            tracing::warn!("Page ceiling is zero, nothing will be fetched");
            outcome.truncated = true;
            return outcome;
        }

        loop {
            let page_number = outcome.pages_requested + 1;
            let result = self
                .transport
                .fetch_page(&filter, cursor.as_deref(), PAGE_SIZE)
                .await;
            outcome.pages_requested = page_number;

            let has_next_page = match result {
                Ok(page) => {
                    outcome.records.extend(page.records);
                    tracing::info!(
                        page = page_number,
                        records = outcome.records.len(),
                        has_next_page = page.has_next_page,
                        "Fetched page"
                    );
                    if page.has_next_page {
                        match page.end_cursor {
                            Some(end_cursor) => cursor = Some(end_cursor),
                            None => {
                                tracing::warn!(
                                    page = page_number,
                                    "Page reported more results without an end cursor"
                                );
                                outcome.truncated = true;
                                break;
                            }
                        }
                    }
                    page.has_next_page
                }
                Err(error) => {
                    tracing::error!(
                        page = page_number,
                        cursor = ?cursor,
                        "Failed to fetch page: {}",
                        error
                    );
                    outcome.failures.push(PageFailure {
                        page: page_number,
                        error,
                    });
                    true
                }
            };

            if outcome.pages_requested >= self.max_pages {
                if has_next_page {
                    outcome.truncated = true;
                    tracing::warn!(
                        "Hit page limit ({}) with {} records, results may be incomplete",
                        self.max_pages,
                        outcome.records.len()
                    );
                }
                break;
            }

            if !has_next_page {
                break;
            }
        }

        outcome
    }
}
