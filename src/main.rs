// src/main.rs
use std::sync::Arc;

use tokio::signal::ctrl_c;
use tokio::time::Duration;

use resale_market::adapter::MarketplaceCoordinator;
use resale_market::config::Config;
use resale_market::domain::errors::AppResult;
use resale_market::infrastructure::notification::LogNotifier;
use resale_market::infrastructure::persistence::MemoryStore;
use resale_market::infrastructure::pricing::{PercentageClaimPricing, RateCardEstimator};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting resale_market v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Claim fee rate {}, commission rate {}",
        config.market.claim_fee_rate,
        config.market.commission_rate
    );
    if config.estimator.rate_card.is_empty() {
        log::warn!("Estimator rate card is empty; orders will wait for manual pricing");
    }

    // Wire the in-memory infrastructure behind the coordinator
    let store = Arc::new(MemoryStore::new());
    let coordinator = Arc::new(MarketplaceCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        Arc::new(PercentageClaimPricing::new(config.market.claim_fee_rate)),
        Arc::new(RateCardEstimator::new(
            config.estimator.rate_card.clone(),
            config.estimator.depreciation,
        )),
        Arc::new(LogNotifier),
        &config.market,
    ));

    // Periodic marketplace heartbeat
    let heartbeat = coordinator.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));

        loop {
            interval.tick().await;

            let open_leads = heartbeat
                .list_leads(&Default::default())
                .await
                .map(|leads| leads.len())
                .unwrap_or(0);
            let agents = heartbeat
                .get_leaderboard()
                .await
                .map(|board| board.len())
                .unwrap_or(0);
            log::info!(
                "Marketplace heartbeat: {} open leads, {} registered agents",
                open_leads,
                agents
            );
        }
    });

    // Wait for shutdown signal
    log::info!("Marketplace core is running. Press Ctrl+C to stop.");
    ctrl_c().await.expect("Failed to listen for control-c event");

    log::info!("Shutting down...");
    Ok(())
}
