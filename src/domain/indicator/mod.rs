//! Technical indicator primitives.
//!
//! Every function here returns a `Vec<f64>` aligned row-for-row with its
//! input, with `f64::NAN` filling the warm-up prefix (and any window that
//! touches an undefined value). Consumers either drop incomplete rows
//! (the feature pipeline) or map non-finite values to `None` (the report
//! layer) via [`last_value`].

pub mod rolling;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod atr;
pub mod stochastic;
pub mod cci;
pub mod volume;
pub mod pivot;

/// Last value of a series as `Some` when defined, `None` during warm-up.
pub fn last_value(values: &[f64]) -> Option<f64> {
    values.last().copied().filter(|v| v.is_finite())
}

/// Value at `index` as `Some` when defined.
pub fn value_at(values: &[f64], index: usize) -> Option<f64> {
    values.get(index).copied().filter(|v| v.is_finite())
}
