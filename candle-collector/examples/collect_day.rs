//! Example: collect one day of BTC/USDT 5m candles from Binance
//!
//! Run with: cargo run -p candle-collector --example collect_day

use candle_collector::data::{spot_file_stem, CandleStore, CsvLayout, Interval, UnitFile};
use candle_collector::exchange::{BinanceSpot, BINANCE_REST_URL};
use candle_collector::fetcher::{CandleFetcher, CandleRequest};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let source = BinanceSpot::new(BINANCE_REST_URL)?;
    let day = NaiveDate::from_ymd_opt(2019, 7, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let request = CandleRequest::new("BTC/USDT", Interval::M5, day);

    let mut fetcher = CandleFetcher::new(&source);
    let series = fetcher.fetch_day(&request).await?;
    println!("Fetched {} candles for {}", series.len(), day);

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!("First candle: {} open={} close={}", first.open_time, first.open, first.close);
        println!("Last candle:  {} open={} close={}", last.open_time, last.open, last.close);
    }

    let store = CandleStore::new("./data");
    let unit = UnitFile::new("binance", "spot", day, spot_file_stem("BTC/USDT", "5m"));
    let path = store.write(&unit, CsvLayout::Spot, &series)?;
    println!("Saved to {}", path.display());

    Ok(())
}
