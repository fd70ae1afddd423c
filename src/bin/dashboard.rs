use spending_tracker::{
    api::{start_server, ApiState},
    gemini::{GeminiClient, TextGenerator},
    summarizer::Summarizer,
    Config, Tracker,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!("Spending Tracker - Dashboard API");
    info!("Port: {}", config.port);

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config)?);
    let mut tracker = Tracker::from_config(&config, generator.clone())?;

    // The ledger is built once; restart the server to pick up new transactions.
    let transactions = tracker.transactions(false).await?;
    info!("Ledger ready with {} transactions", transactions.len());

    let state = ApiState {
        transactions: Arc::new(transactions),
        summarizer: Arc::new(Summarizer::new(generator)),
    };

    start_server(state, config.port).await?;

    Ok(())
}
