//! Batch collection module
//!
//! Drives the fetcher over day × symbol × interval units and accumulates the
//! outcome of each unit in a [`RunReport`].

pub mod report;
pub mod runner;

pub use report::*;
pub use runner::*;
