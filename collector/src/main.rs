use anyhow::{Context, Result};
use candle_collector::batch::{run_delivery_batch, run_spot_batch, RunReport};
use candle_collector::data::CandleStore;
use candle_collector::exchange::{BinanceSpot, OkexDelivery};
use shared::Config;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Candle collector
// Pulls daily spot history and delivery contract candles into CSV files

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let program_start = Instant::now();
    let config = Config::from_env().context("Failed to load configuration")?;
    let store = CandleStore::new(&config.output_root);
    info!("Starting candle collector, writing to {}", store.root().display());

    let mut report = RunReport::new();

    if config.collect_spot {
        let binance = BinanceSpot::new(&config.binance_rest_url)?;
        match run_spot_batch(&binance, &store, &config.spot).await {
            Ok(spot) => report.merge(spot),
            Err(e) => error!("Spot collection aborted: {}", e),
        }
    }

    if config.collect_delivery {
        let okex = OkexDelivery::new(&config.okex_rest_url)?;
        match run_delivery_batch(&okex, &store, &config.delivery).await {
            Ok(delivery) => report.merge(delivery),
            Err(e) => error!("Delivery collection aborted: {}", e),
        }
    }

    report.elapsed = program_start.elapsed();
    info!("{}", report.format());
    if !report.is_clean() {
        error!("Failed units: {:?}", report.errors);
    }

    Ok(())
}
