pub mod config;
pub mod fetcher;
pub mod filter;
pub mod github;
pub mod merge_time;
pub mod querier;
pub mod report;
pub mod reviewers;
pub mod types;

pub use config::AppConfig;
pub use querier::{ReportQuerier, ReportSummary};
