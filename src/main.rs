// src/main.rs

use chain_normalizer::{config::Config, ingest::run_line_loop, AppState};
use tokio::io;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout carries protocol traffic only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chain_normalizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    info!(
        "🚀 Starting normalizer on stdin/stdout ({} token assets configured)",
        config.token_assets.len()
    );

    let state = AppState::new(config);
    let stdin = io::BufReader::new(io::stdin());
    run_line_loop(state, stdin, io::stdout()).await;

    info!("Normalizer shutting down");
}
