//! Binance spot klines over REST

use crate::data::{Candle, Interval};
use crate::error::DataError;
use crate::exchange::client::{cell_f64, http_client, CandleSource, SourcePolicy};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const BINANCE_REST_URL: &str = "https://api.binance.com";

/// Binance REST API error payload, e.g. `{ "code": -1121, "msg": "Invalid symbol." }`
#[derive(Debug, Deserialize)]
struct BinanceApiError {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    #[serde(rename = "baseAsset")]
    base_asset: String,
    #[serde(rename = "quoteAsset")]
    quote_asset: String,
}

/// Binance spot market candle source.
///
/// Symbols are written `BASE/QUOTE` and mapped to Binance's concatenated
/// market names on the wire.
#[derive(Debug, Clone)]
pub struct BinanceSpot {
    client: reqwest::Client,
    base_url: String,
    policy: SourcePolicy,
}

impl BinanceSpot {
    pub const ID: &'static str = "binance";

    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: SourcePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `BTC/USDT` -> `BTCUSDT`
    pub fn market_name(symbol: &str) -> String {
        symbol.replace('/', "")
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, DataError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<BinanceApiError>(&body) {
                Ok(error) => DataError::Api {
                    exchange: Self::ID,
                    code: error.code.to_string(),
                    msg: error.msg,
                },
                Err(_) => DataError::Api {
                    exchange: Self::ID,
                    code: status.as_u16().to_string(),
                    msg: body,
                },
            });
        }

        Ok(response.json().await?)
    }
}

/// Binance kline rows are mixed-type arrays:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume, trades, ...]`
fn parse_kline(row: &[Value]) -> Result<Candle, DataError> {
    let open_time = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| DataError::Decode(format!("missing open_time in {:?}", row)))?;
    let open_time = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| DataError::Decode(format!("invalid open_time millis: {}", open_time)))?;

    Ok(Candle::new(
        open_time,
        cell_f64(row, 1, "open")?,
        cell_f64(row, 2, "high")?,
        cell_f64(row, 3, "low")?,
        cell_f64(row, 4, "close")?,
        cell_f64(row, 5, "volume")?,
    ))
}

impl CandleSource for BinanceSpot {
    fn exchange_id(&self) -> &'static str {
        Self::ID
    }

    fn policy(&self) -> SourcePolicy {
        self.policy
    }

    async fn load_markets(&self) -> Result<Vec<String>, DataError> {
        let info: ExchangeInfo =
            serde_json::from_value(self.get_json("/api/v3/exchangeInfo", &[]).await?)
                .map_err(|e| DataError::Decode(format!("exchangeInfo: {}", e)))?;

        Ok(info
            .symbols
            .into_iter()
            .map(|s| format!("{}/{}", s.base_asset, s.quote_asset))
            .collect())
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        since: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<Candle>, DataError> {
        let mut query = vec![
            ("symbol", Self::market_name(symbol)),
            ("interval", interval.label().to_string()),
            ("startTime", since.timestamp_millis().to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let rows: Vec<Vec<Value>> =
            serde_json::from_value(self.get_json("/api/v3/klines", &query).await?)
                .map_err(|e| DataError::Decode(format!("klines: {}", e)))?;
        debug!("Binance returned {} klines for {} {} since {}", rows.len(), symbol, interval, since);

        rows.iter().map(|row| parse_kline(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_market_name() {
        assert_eq!(BinanceSpot::market_name("BTC/USDT"), "BTCUSDT");
    }

    #[test]
    fn test_parse_kline() {
        let row = json!([1561939200000_i64, "10577.8", "10600.0", "10550.1", "10580.0", "120.5",
            1561939499999_i64, "1275000.0", 1500, "60.0", "637000.0", "0"]);
        let candle = parse_kline(row.as_array().unwrap()).unwrap();
        assert_eq!(candle.open_time_millis(), 1561939200000);
        assert_eq!(candle.open, 10577.8);
        assert_eq!(candle.volume, 120.5);
        assert_eq!(candle.quote_volume, None);
    }
}
