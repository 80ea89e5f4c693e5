//! Spot and delivery batch drivers

use crate::batch::{unit_id, RunReport};
use crate::config::{DeliveryPlan, SpotPlan};
use crate::data::{spot_file_stem, CandleStore, CsvLayout, Interval, UnitFile};
use crate::error::CollectorError;
use crate::exchange::CandleSource;
use crate::fetcher::{CandleFetcher, CandleRequest};
use crate::Result;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{error, info, warn};

pub const SPOT_MARKET: &str = "spot";
pub const DELIVERY_MARKET: &str = "delivery";

/// One fetch-and-write job
#[derive(Debug, Clone)]
pub struct CollectUnit {
    pub request: CandleRequest,
    pub file: UnitFile,
    pub layout: CsvLayout,
}

/// Fetch and store every unit in order.
///
/// A failing unit is logged and recorded in [`RunReport::errors`]; the
/// remaining units still run. Units without any candle for their day are
/// recorded in [`RunReport::skipped`] and no file is written for them.
pub async fn run_units<S, I>(source: &S, store: &CandleStore, units: I) -> RunReport
where
    S: CandleSource,
    I: IntoIterator<Item = CollectUnit>,
{
    let started = Instant::now();
    let mut fetcher = CandleFetcher::new(source);
    let mut report = RunReport::new();

    for unit in units {
        let id = unit_id(source.exchange_id(), &unit.request.symbol, unit.request.interval);
        info!(
            "{} {} {} {}",
            unit.request.day,
            source.exchange_id(),
            unit.request.symbol,
            unit.request.interval
        );

        let outcome = match fetcher.fetch_day(&unit.request).await {
            Ok(series) if series.is_empty() => {
                warn!("No candles for {} on {}, skipping", id, unit.request.day);
                report.skipped.push(id);
                continue;
            }
            Ok(series) => store.write(&unit.file, unit.layout, &series),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(path) => report.written.push(path),
            Err(e) => {
                error!("{}", e);
                report.errors.push(id);
            }
        }
    }

    report.elapsed = started.elapsed();
    report
}

/// Collect the spot history plan from one exchange.
///
/// Symbols the exchange does not list are skipped with a warning.
pub async fn run_spot_batch<S>(source: &S, store: &CandleStore, plan: &SpotPlan) -> Result<RunReport>
where
    S: CandleSource,
{
    let days = plan.days();
    info!("Collecting {} spot days: {:?}", days.len(), days);

    let listed: HashSet<String> = source
        .load_markets()
        .await
        .map_err(|source_error| CollectorError::Markets {
            exchange: source.exchange_id(),
            source: source_error,
        })?
        .into_iter()
        .collect();

    let symbols: Vec<&String> = plan
        .symbols
        .iter()
        .filter(|symbol| {
            let is_listed = listed.contains(symbol.as_str());
            if !is_listed {
                warn!("{} does not list {}, skipping", source.exchange_id(), symbol);
            }
            is_listed
        })
        .collect();

    let page_limit = source.policy().page_limit;
    let mut units = Vec::new();
    for day in &days {
        for symbol in &symbols {
            for interval in &plan.intervals {
                units.push(CollectUnit {
                    request: CandleRequest::new(symbol.as_str(), *interval, *day)
                        .with_page_limit(page_limit),
                    file: UnitFile::new(
                        source.exchange_id(),
                        SPOT_MARKET,
                        *day,
                        spot_file_stem(symbol, interval.label()),
                    ),
                    layout: CsvLayout::Spot,
                });
            }
        }
    }

    Ok(run_units(source, store, units).await)
}

/// Delivery file stem: `<instrument>_<minutes>m_<tenor>`
pub fn delivery_file_stem(instrument_id: &str, granularity: i64, tenor: &str) -> String {
    format!("{}_{}m_{}", instrument_id.replace('/', "-"), granularity / 60, tenor)
}

/// Collect the delivery contract plan.
///
/// Contracts missing from the current instrument list are still requested,
/// since expired contracts drop out of the listing.
pub async fn run_delivery_batch<S>(
    source: &S,
    store: &CandleStore,
    plan: &DeliveryPlan,
) -> Result<RunReport>
where
    S: CandleSource,
{
    let interval = Interval::from_seconds(plan.granularity)
        .ok_or(CollectorError::Granularity(plan.granularity))?;
    let days = plan.days();
    info!("Collecting {} delivery days: {:?}", days.len(), days);

    match source.load_markets().await {
        Ok(listed) => {
            for contract in &plan.contracts {
                if !listed.contains(&contract.instrument_id) {
                    warn!("{} is not currently listed on {}", contract.instrument_id, source.exchange_id());
                }
            }
        }
        Err(e) => warn!("Could not load {} instruments: {}", source.exchange_id(), e),
    }

    let page_limit = source.policy().page_limit;
    let mut units = Vec::new();
    for day in &days {
        for contract in &plan.contracts {
            units.push(CollectUnit {
                request: CandleRequest::new(contract.instrument_id.as_str(), interval, *day)
                    .with_page_limit(page_limit),
                file: UnitFile::new(
                    source.exchange_id(),
                    DELIVERY_MARKET,
                    *day,
                    delivery_file_stem(&contract.instrument_id, plan.granularity, contract.tenor.label()),
                ),
                layout: CsvLayout::Delivery,
            });
        }
    }

    Ok(run_units(source, store, units).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_file_stem() {
        assert_eq!(
            delivery_file_stem("BTC-USD-200717", 300, "this_week"),
            "BTC-USD-200717_5m_this_week"
        );
    }
}
