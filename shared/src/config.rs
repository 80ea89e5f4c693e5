use anyhow::{anyhow, Context};
use candle_collector::config::{DeliveryContract, DeliveryPlan, SpotPlan};
use candle_collector::data::Interval;
use candle_collector::exchange::{BINANCE_REST_URL, OKEX_REST_URL};
use chrono::NaiveDate;
use dotenv::dotenv;
use std::str::FromStr;

pub struct Config {
    pub output_root: String,
    pub binance_rest_url: String,
    pub okex_rest_url: String,
    pub collect_spot: bool,
    pub collect_delivery: bool,
    pub spot: SpotPlan,
    pub delivery: DeliveryPlan,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to the built-in plans.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let spot_defaults = SpotPlan::default();
        let delivery_defaults = DeliveryPlan::default();

        Ok(Config {
            output_root: lookup("OUTPUT_ROOT").unwrap_or_else(|| "./data".to_string()),
            binance_rest_url: lookup("BINANCE_REST_URL")
                .unwrap_or_else(|| BINANCE_REST_URL.to_string()),
            okex_rest_url: lookup("OKEX_REST_URL").unwrap_or_else(|| OKEX_REST_URL.to_string()),
            collect_spot: parse_or(&lookup, "COLLECT_SPOT", true)?,
            collect_delivery: parse_or(&lookup, "COLLECT_DELIVERY", true)?,
            spot: SpotPlan {
                symbols: match lookup("SPOT_SYMBOLS") {
                    Some(raw) => split_list(&raw).map(String::from).collect(),
                    None => spot_defaults.symbols,
                },
                intervals: list_or(&lookup, "SPOT_INTERVALS", spot_defaults.intervals)?,
                begin_date: date_or(&lookup, "SPOT_BEGIN_DATE", spot_defaults.begin_date)?,
                end_date: date_or(&lookup, "SPOT_END_DATE", spot_defaults.end_date)?,
            },
            delivery: DeliveryPlan {
                contracts: list_or::<_, DeliveryContract>(
                    &lookup,
                    "DELIVERY_CONTRACTS",
                    delivery_defaults.contracts,
                )?,
                granularity: parse_or(&lookup, "DELIVERY_GRANULARITY", delivery_defaults.granularity)?,
                begin_date: date_or(&lookup, "DELIVERY_BEGIN_DATE", delivery_defaults.begin_date)?,
                end_date: date_or(&lookup, "DELIVERY_END_DATE", delivery_defaults.end_date)?,
            },
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{}: {}", key, e)),
        None => Ok(default),
    }
}

fn list_or<F, T>(lookup: &F, key: &str, default: Vec<T>) -> Result<Vec<T>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => split_list(&raw)
            .map(|item| item.parse().map_err(|e| anyhow!("{}: {}", key, e)))
            .collect(),
        None => Ok(default),
    }
}

fn date_or<F>(lookup: &F, key: &str, default: NaiveDate) -> Result<NaiveDate, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("{} must be YYYY-MM-DD, got {}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_collector::config::Tenor;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.output_root, "./data");
        assert_eq!(config.spot, SpotPlan::default());
        assert_eq!(config.delivery, DeliveryPlan::default());
        assert!(config.collect_spot && config.collect_delivery);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SPOT_SYMBOLS", "BTC/USDT, ETH/USDT,"),
            ("SPOT_INTERVALS", "1h"),
            ("SPOT_END_DATE", "2019-07-31"),
            ("DELIVERY_CONTRACTS", "BTC-USD-200925:quarter"),
            ("COLLECT_DELIVERY", "false"),
        ])
        .unwrap();

        assert_eq!(config.spot.symbols, vec!["BTC/USDT", "ETH/USDT"]);
        assert_eq!(config.spot.intervals, vec![Interval::H1]);
        assert_eq!(config.spot.end_date, NaiveDate::from_ymd_opt(2019, 7, 31).unwrap());
        assert_eq!(config.delivery.contracts, vec![DeliveryContract::new("BTC-USD-200925", Tenor::Quarter)]);
        assert!(!config.collect_delivery);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("SPOT_INTERVALS", "5m,7m")]).is_err());
        assert!(config_from(&[("SPOT_BEGIN_DATE", "07/01/2019")]).is_err());
        assert!(config_from(&[("DELIVERY_GRANULARITY", "five")]).is_err());
    }
}
