//! Exchange integration module
//!
//! REST candle sources and the pacing policy shared by them.

pub mod binance;
pub mod client;
pub mod okex;
pub mod pacer;

pub use binance::*;
pub use client::*;
pub use okex::*;
pub use pacer::*;
