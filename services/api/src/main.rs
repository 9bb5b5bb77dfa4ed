mod config;
mod handlers;
mod server;

use anyhow::{Context, Result};
use basin_pool::{PoolEngine, PoolSeed};
use std::sync::Arc;
use tracing::{info, warn};

use config::ApiConfig;
use handlers::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Basin AMM API...");

    let config = ApiConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        "✅ Configuration loaded: {}/{} pool, fee {:.2}%",
        config.token_a,
        config.token_b,
        config.fee_rate * 100.0
    );

    let engine = PoolEngine::new(PoolSeed {
        reserve_a: config.seed_reserve_a,
        reserve_b: config.seed_reserve_b,
    })
    .context("Failed to seed the pool")?;
    info!(
        "✅ Pool seeded: {} {} / {} {}",
        config.seed_reserve_a, config.token_a, config.seed_reserve_b, config.token_b
    );

    if config.enable_reset {
        warn!("⚠️ Admin reset endpoint is enabled; keep this instance off untrusted networks");
    }

    let state = Arc::new(AppState::new(engine, config));

    server::serve(state).await.context("API server failed")?;

    Ok(())
}
