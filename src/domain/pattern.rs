//! Chart pattern detection seam.
//!
//! Pattern recognition is an extension point rather than a shipped
//! capability. [`NoPatternDetector`] is the default implementation and
//! reports every known pattern as not detected, so downstream
//! consumers see a stable set of pattern names either way.

/// Names every detector is expected to report on, in report order.
pub const PATTERN_NAMES: [&str; 9] = [
    "double_top",
    "double_bottom",
    "head_shoulders",
    "inverse_head_shoulders",
    "ascending_triangle",
    "descending_triangle",
    "symmetrical_triangle",
    "bull_flag",
    "bear_flag",
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PatternMatch {
    pub name: String,
    pub detected: bool,
    /// Detector confidence in [0, 1]; 0 when not detected.
    pub confidence: f64,
}

impl PatternMatch {
    pub fn not_detected(name: &str) -> Self {
        Self {
            name: name.to_string(),
            detected: false,
            confidence: 0.0,
        }
    }
}

/// Scans a price history for chart patterns.
pub trait PatternDetector {
    fn detect(&self, highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<PatternMatch>;
}

/// Default detector: reports all known patterns as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPatternDetector;

impl PatternDetector for NoPatternDetector {
    fn detect(&self, _highs: &[f64], _lows: &[f64], _closes: &[f64]) -> Vec<PatternMatch> {
        PATTERN_NAMES
            .iter()
            .map(|name| PatternMatch::not_detected(name))
            .collect()
    }
}
