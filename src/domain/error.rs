//! Domain error types.
//!
//! Structural problems (bad bars, missing config, too little history) surface
//! as variants here and propagate with `?`. Degenerate numeric input never
//! does: each computation site documents a safe default instead (Sharpe 0
//! when volatility is 0, stochastic %K 50 on a flat window, and so on).

/// Top-level error type for marketlens.
#[derive(Debug, thiserror::Error)]
pub enum MarketlensError {
    #[error("invalid price data: {reason}")]
    Validation { reason: String },

    #[error("insufficient data for {symbol}: have {rows} usable rows, need {minimum}")]
    InsufficientData {
        symbol: String,
        rows: usize,
        minimum: usize,
    },

    #[error("no assets supplied for optimization")]
    NoAssets,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn exit_code(err: &MarketlensError) -> u8 {
    match err {
        MarketlensError::Io(_) => 1,
        MarketlensError::ConfigParse { .. }
        | MarketlensError::ConfigMissing { .. }
        | MarketlensError::ConfigInvalid { .. } => 2,
        MarketlensError::Data { .. } => 3,
        MarketlensError::Validation { .. } => 4,
        MarketlensError::NoAssets | MarketlensError::InsufficientData { .. } => 5,
    }
}

impl From<&MarketlensError> for std::process::ExitCode {
    fn from(err: &MarketlensError) -> Self {
        std::process::ExitCode::from(exit_code(err))
    }
}
