//! Collection plans

use crate::data::Interval;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every UTC day from `begin` through `end`, both inclusive
pub fn date_range(begin: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = begin;
    while day <= end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// Spot history collection plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotPlan {
    /// Symbols to collect, `BASE/QUOTE`
    pub symbols: Vec<String>,
    /// Candle intervals to collect for every symbol
    pub intervals: Vec<Interval>,
    /// First day (inclusive)
    pub begin_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
}

impl SpotPlan {
    pub fn days(&self) -> Vec<NaiveDate> {
        date_range(self.begin_date, self.end_date)
    }
}

impl Default for SpotPlan {
    fn default() -> Self {
        Self {
            symbols: ["BTC/USDT", "ETH/USDT", "EOS/USDT", "LTC/USDT", "BNB/USDT", "XRP/USDT"]
                .into_iter()
                .map(String::from)
                .collect(),
            intervals: vec![Interval::M5, Interval::M15],
            begin_date: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2019, 7, 2).unwrap_or_default(),
        }
    }
}

/// Position of a delivery contract in the expiry ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenor {
    ThisWeek,
    NextWeek,
    Quarter,
    NextQuarter,
}

impl Tenor {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ThisWeek => "this_week",
            Self::NextWeek => "next_week",
            Self::Quarter => "quarter",
            Self::NextQuarter => "next_quarter",
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tenor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "this_week" => Ok(Self::ThisWeek),
            "next_week" => Ok(Self::NextWeek),
            "quarter" => Ok(Self::Quarter),
            "next_quarter" => Ok(Self::NextQuarter),
            other => Err(format!("Unknown contract tenor: {}", other)),
        }
    }
}

/// A dated futures contract and its tenor label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryContract {
    /// Expiry-coded id, e.g. `BTC-USD-200717`
    pub instrument_id: String,
    pub tenor: Tenor,
}

impl DeliveryContract {
    pub fn new(instrument_id: impl Into<String>, tenor: Tenor) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            tenor,
        }
    }
}

impl FromStr for DeliveryContract {
    type Err = String;

    /// Parses `BTC-USD-200717:this_week`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, tenor) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("Expected <instrument_id>:<tenor>, got: {}", s))?;
        if id.is_empty() {
            return Err(format!("Missing instrument id in: {}", s));
        }
        Ok(Self::new(id, tenor.parse()?))
    }
}

/// Delivery contract collection plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPlan {
    pub contracts: Vec<DeliveryContract>,
    /// Candle width in seconds
    pub granularity: i64,
    /// First day (inclusive)
    pub begin_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
}

impl DeliveryPlan {
    pub fn days(&self) -> Vec<NaiveDate> {
        date_range(self.begin_date, self.end_date)
    }
}

impl Default for DeliveryPlan {
    fn default() -> Self {
        let tenors = [Tenor::ThisWeek, Tenor::NextWeek, Tenor::Quarter, Tenor::NextQuarter];
        let expiries = ["200717", "200724", "200925", "201225"];
        let contracts = ["BTC-USD", "BTC-USDT"]
            .into_iter()
            .flat_map(|underlying| {
                expiries
                    .iter()
                    .zip(tenors)
                    .map(move |(expiry, tenor)| {
                        DeliveryContract::new(format!("{}-{}", underlying, expiry), tenor)
                    })
            })
            .collect();

        let day = NaiveDate::from_ymd_opt(2020, 7, 11).unwrap_or_default();
        Self {
            contracts,
            granularity: 300,
            begin_date: day,
            end_date: day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_inclusive() {
        let begin = NaiveDate::from_ymd_opt(2019, 6, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 7, 2).unwrap();
        let days = date_range(begin, end);
        assert_eq!(days.len(), 3);
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2019, 7, 1).unwrap());
        assert!(date_range(end, begin).is_empty());
    }

    #[test]
    fn test_default_delivery_contracts() {
        let plan = DeliveryPlan::default();
        assert_eq!(plan.contracts.len(), 8);
        assert_eq!(plan.contracts[0], DeliveryContract::new("BTC-USD-200717", Tenor::ThisWeek));
        assert_eq!(plan.contracts[7], DeliveryContract::new("BTC-USDT-201225", Tenor::NextQuarter));
    }

    #[test]
    fn test_parse_contract() {
        let contract: DeliveryContract = "BTC-USDT-200925:quarter".parse().unwrap();
        assert_eq!(contract.instrument_id, "BTC-USDT-200925");
        assert_eq!(contract.tenor, Tenor::Quarter);
        assert!("BTC-USDT-200925".parse::<DeliveryContract>().is_err());
        assert!("BTC-USDT-200925:monthly".parse::<DeliveryContract>().is_err());
    }
}
