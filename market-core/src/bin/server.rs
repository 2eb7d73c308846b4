//! Marketplace server binary

use anyhow::Context;
use market_core::{Config, Market};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Bazaar Market Server");

    // Load configuration
    let config = Config::from_env().context("loading configuration")?;

    // Open market
    let market = Market::open(config).await?;
    tracing::info!("Market opened successfully");

    // TODO: expose the market API over a transport here
    // For now, just keep running
    tokio::signal::ctrl_c().await?;

    let stats = market.stats()?;
    tracing::info!(
        listings = stats.total_listings,
        sold_items = stats.total_sold_items,
        reviews = stats.total_reviews,
        "Shutting down market server"
    );

    market.shutdown().await?;
    Ok(())
}
