//! Run report

use crate::data::Interval;
use std::path::PathBuf;
use std::time::Duration;

/// Identifier of one unit in skip and error lists, e.g. `binance_BTC/USDT_5m`
pub fn unit_id(exchange: &str, symbol: &str, interval: Interval) -> String {
    [exchange, symbol, interval.label()].join("_")
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Files written
    pub written: Vec<PathBuf>,
    /// Units that returned no candles for their day
    pub skipped: Vec<String>,
    /// Units whose fetch or write failed
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another run into this one
    pub fn merge(&mut self, other: RunReport) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
        self.elapsed += other.elapsed;
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Format report as string
    pub fn format(&self) -> String {
        format!(
            r#"
Collection Results
==================
Files Written: {}
Skipped (no data): {}
Errors: {}
Error Units: {:?}
Run Time: {:.1}s
"#,
            self.written.len(),
            self.skipped.len(),
            self.errors.len(),
            self.errors,
            self.elapsed.as_secs_f64(),
        )
    }
}
