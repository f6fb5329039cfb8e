//! Core domain types and logic.

pub mod ohlcv;
pub mod macro_context;
pub mod indicator;
pub mod risk;
pub mod report;
pub mod pattern;
pub mod analyzer;
pub mod features;
pub mod model;
pub mod prediction;
pub mod predictor;
pub mod optimizer;
pub mod error;
