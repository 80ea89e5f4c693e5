//! Data management module
//!
//! Candle model, day series merging and CSV storage.

pub mod candle;
pub mod storage;

pub use candle::*;
pub use storage::*;
