use pr_analysis::{AppConfig, ReportQuerier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // A missing .env file is fine, the environment may already be populated.
    dotenvy::dotenv().ok();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_analysis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let querier = match ReportQuerier::new(&config) {
        Ok(querier) => querier,
        Err(e) => {
            tracing::error!("Failed to create GitHub client: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    match querier.run().await {
        Ok(summary) => {
            if summary.failed_pages > 0 {
                tracing::warn!(
                    "{} of {} pages failed, the report is partial",
                    summary.failed_pages,
                    summary.pages_requested
                );
            }
            if summary.truncated {
                tracing::warn!(
                    "Stopped after {} pages, raise MAX_PAGE_COUNT_LIMIT to include older pull requests",
                    summary.pages_requested
                );
            }
            tracing::info!("Wrote {} pull requests to {}", summary.rows, summary.path.display());
        }
        Err(e) => {
            tracing::error!("Failed to generate report: {:#}", e);
            std::process::exit(1);
        }
    }
}
