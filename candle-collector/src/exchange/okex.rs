//! OKEx futures delivery contract candles over REST

use crate::data::{Candle, Interval};
use crate::error::DataError;
use crate::exchange::client::{cell_f64, http_client, CandleSource, SourcePolicy};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const OKEX_REST_URL: &str = "https://www.okex.com";

/// Rows served per candles request.
pub const OKEX_MAX_ROWS: u32 = 200;

#[derive(Debug, Deserialize)]
struct OkexApiError {
    #[serde(alias = "error_code")]
    code: Value,
    #[serde(alias = "error_message", alias = "msg")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    instrument_id: String,
}

/// OKEx delivery futures source, keyed by instrument id such as `BTC-USD-200717`.
#[derive(Debug, Clone)]
pub struct OkexDelivery {
    client: reqwest::Client,
    base_url: String,
    policy: SourcePolicy,
}

impl OkexDelivery {
    pub const ID: &'static str = "okex";

    /// 20 calls per 2 seconds
    pub const DEFAULT_POLICY: SourcePolicy = SourcePolicy {
        page_limit: Some(OKEX_MAX_ROWS),
        min_call_interval: std::time::Duration::from_millis(100),
    };

    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: Self::DEFAULT_POLICY,
        })
    }

    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
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
            return Err(match serde_json::from_str::<OkexApiError>(&body) {
                Ok(error) => DataError::Api {
                    exchange: Self::ID,
                    code: match error.code {
                        Value::String(code) => code,
                        other => other.to_string(),
                    },
                    msg: error.message,
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

    /// Direct candle query for `[start, end)` at `granularity` seconds.
    ///
    /// Rows come back newest first with 7 columns
    /// `[timestamp, open, high, low, close, volume, currency_volume]`;
    /// the result is reordered ascending.
    pub async fn fetch_range(
        &self,
        instrument_id: &str,
        granularity: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, DataError> {
        let query = [
            ("granularity", granularity.to_string()),
            ("start", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        let path = format!("/api/futures/v3/instruments/{}/candles", instrument_id);

        let rows: Vec<Vec<Value>> = serde_json::from_value(self.get_json(&path, &query).await?)
            .map_err(|e| DataError::Decode(format!("candles: {}", e)))?;
        debug!(
            "OKEx returned {} candles for {} between {} and {}",
            rows.len(),
            instrument_id,
            start,
            end
        );

        let mut candles = rows
            .iter()
            .map(|row| parse_candle(row))
            .collect::<Result<Vec<_>, _>>()?;
        candles.retain(|c| c.open_time < end);
        candles.sort_by_key(|c| c.open_time);
        Ok(candles)
    }
}

fn parse_candle(row: &[Value]) -> Result<Candle, DataError> {
    let timestamp = row
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::Decode(format!("missing timestamp in {:?}", row)))?;
    let open_time = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| DataError::Decode(format!("invalid timestamp '{}': {}", timestamp, e)))?
        .with_timezone(&Utc);

    Ok(Candle::new(
        open_time,
        cell_f64(row, 1, "open")?,
        cell_f64(row, 2, "high")?,
        cell_f64(row, 3, "low")?,
        cell_f64(row, 4, "close")?,
        cell_f64(row, 5, "volume")?,
    )
    .with_quote_volume(cell_f64(row, 6, "currency_volume")?))
}

impl CandleSource for OkexDelivery {
    fn exchange_id(&self) -> &'static str {
        Self::ID
    }

    fn policy(&self) -> SourcePolicy {
        self.policy
    }

    async fn load_markets(&self) -> Result<Vec<String>, DataError> {
        let instruments: Vec<InstrumentInfo> =
            serde_json::from_value(self.get_json("/api/futures/v3/instruments", &[]).await?)
                .map_err(|e| DataError::Decode(format!("instruments: {}", e)))?;

        Ok(instruments.into_iter().map(|i| i.instrument_id).collect())
    }

    /// Pages are expressed as a `[since, since + limit * interval)` range query.
    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        since: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<Candle>, DataError> {
        let rows = limit.unwrap_or(OKEX_MAX_ROWS).min(OKEX_MAX_ROWS);
        let end = since + Duration::seconds(interval.seconds() * i64::from(rows));

        let mut candles = self
            .fetch_range(symbol, interval.seconds(), since, end)
            .await?;
        candles.truncate(rows as usize);
        Ok(candles)
    }
}
