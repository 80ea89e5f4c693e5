//! Configuration module

pub mod plan;

pub use plan::*;
