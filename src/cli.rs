//! CLI definition and dispatch.
//!
//! Subcommands wire the file adapters to the domain engines and print
//! results to stdout; progress and errors go to stderr. Every failure
//! path funnels through [`MarketlensError`] so exit codes stay
//! consistent across commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::static_macro_adapter::StaticMacroAdapter;
use crate::domain::analyzer::IndicatorEngine;
use crate::domain::error::MarketlensError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::optimizer::{
    Allocation, CorrelationMode, PortfolioOptimizer, RiskTolerance, WeightScheme,
};
use crate::domain::prediction::{Prediction, Scenario};
use crate::domain::predictor::PredictionEngine;
use crate::domain::report::IndicatorReport;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::macro_port::MacroPort;

#[derive(Parser, Debug)]
#[command(name = "marketlens", about = "Technical analysis and market forecasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the technical analysis report for one symbol
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run the forecasting models for one symbol
    Predict {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        /// Horizon label carried into the output
        #[arg(long, default_value = "30d")]
        horizon: String,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Allocate an investment amount across symbols
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols; defaults to [portfolio] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Defaults to [portfolio] investment_amount, else 100000
        #[arg(long)]
        amount: Option<f64>,
        /// conservative, moderate or aggressive
        #[arg(long)]
        risk_tolerance: Option<String>,
        /// Rescale profile weights to sum to one
        #[arg(long)]
        normalize: bool,
        /// Derive correlation from returns instead of the 0.5 placeholder
        #[arg(long)]
        computed_correlation: bool,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List symbols with data files available
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the stored data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            config,
            symbol,
            format,
        } => run_analyze(&config, &symbol, &format),
        Command::Predict {
            config,
            symbol,
            horizon,
            format,
        } => run_predict(&config, &symbol, &horizon, &format),
        Command::Optimize {
            config,
            symbols,
            amount,
            risk_tolerance,
            normalize,
            computed_correlation,
            format,
        } => run_optimize(
            &config,
            symbols.as_deref(),
            amount,
            risk_tolerance.as_deref(),
            normalize,
            computed_correlation,
            &format,
        ),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Info { config, symbol } => run_info(&config, &symbol),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = MarketlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(MarketlensError::Validation {
                reason: format!("unknown output format '{other}' (expected text or json)"),
            }),
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MarketlensError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

pub fn data_adapter(config: &dyn ConfigPort) -> Result<CsvAdapter, MarketlensError> {
    let dir = config
        .get_string("data", "path")
        .ok_or_else(|| MarketlensError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(dir)))
}

fn date_bound(
    config: &dyn ConfigPort,
    key: &str,
    fallback: NaiveDate,
) -> Result<NaiveDate, MarketlensError> {
    match config.get_string("data", key) {
        Some(s) => {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| MarketlensError::ConfigInvalid {
                section: "data".into(),
                key: key.into(),
                reason: "invalid date format (expected YYYY-MM-DD)".into(),
            })
        }
        None => Ok(fallback),
    }
}

/// Fetches one symbol's bars inside the configured `[data]` date window
/// (unbounded when unset) and validates them into a series.
pub fn load_series(
    data: &dyn DataPort,
    config: &dyn ConfigPort,
    symbol: &str,
) -> Result<PriceSeries, MarketlensError> {
    let start = date_bound(config, "start_date", NaiveDate::MIN)?;
    let end = date_bound(config, "end_date", NaiveDate::MAX)?;
    let bars = data.fetch_bars(symbol, start, end)?;
    PriceSeries::new(symbol, bars)
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, MarketlensError> {
    let mut symbols: Vec<String> = Vec::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(MarketlensError::Validation {
                reason: "empty token in symbol list".into(),
            });
        }
        let symbol = trimmed.to_uppercase();
        if symbols.contains(&symbol) {
            return Err(MarketlensError::Validation {
                reason: format!("duplicate symbol: {symbol}"),
            });
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn run_analyze(config_path: &Path, symbol: &str, format: &str) -> Result<(), MarketlensError> {
    let format = OutputFormat::from_str(format)?;
    let config = load_config(config_path)?;
    let data = data_adapter(&config)?;

    let symbol = symbol.trim().to_uppercase();
    let series = load_series(&data, &config, &symbol)?;
    eprintln!("Analyzing {}: {} bars", symbol, series.len());

    let report = IndicatorEngine::new().analyze(&series)?;

    match format {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

pub fn run_predict(
    config_path: &Path,
    symbol: &str,
    horizon: &str,
    format: &str,
) -> Result<(), MarketlensError> {
    let format = OutputFormat::from_str(format)?;
    let config = load_config(config_path)?;
    let data = data_adapter(&config)?;

    let symbol = symbol.trim().to_uppercase();
    let series = load_series(&data, &config, &symbol)?;
    let macro_context = StaticMacroAdapter::from_config(&config).current_context()?;

    eprintln!("Fitting models for {}: {} bars", symbol, series.len());
    let prediction = PredictionEngine::new().predict(&series, &macro_context, horizon)?;

    match format {
        OutputFormat::Json => println!("{}", to_json(&prediction)?),
        OutputFormat::Text => print_prediction(&prediction),
    }
    Ok(())
}

pub fn run_optimize(
    config_path: &Path,
    symbols_override: Option<&str>,
    amount_override: Option<f64>,
    tolerance_override: Option<&str>,
    normalize: bool,
    computed_correlation: bool,
    format: &str,
) -> Result<(), MarketlensError> {
    let format = OutputFormat::from_str(format)?;
    let config = load_config(config_path)?;
    let data = data_adapter(&config)?;

    let symbols_raw = match symbols_override {
        Some(s) => s.to_string(),
        None => config.get_string("portfolio", "symbols").ok_or_else(|| {
            MarketlensError::ConfigMissing {
                section: "portfolio".into(),
                key: "symbols".into(),
            }
        })?,
    };
    let symbols = parse_symbols(&symbols_raw)?;

    let amount = amount_override
        .unwrap_or_else(|| config.get_double("portfolio", "investment_amount", 100_000.0));

    let tolerance = match tolerance_override {
        Some(s) => RiskTolerance::from_str(s)?,
        None => match config.get_string("portfolio", "risk_tolerance") {
            Some(s) => RiskTolerance::from_str(&s)?,
            None => RiskTolerance::Moderate,
        },
    };

    let mut assets = BTreeMap::new();
    for symbol in &symbols {
        let series = load_series(&data, &config, symbol)?;
        eprintln!("  {}: {} bars", symbol, series.len());
        assets.insert(symbol.clone(), series);
    }

    let weight_scheme = if normalize {
        WeightScheme::Normalized
    } else {
        WeightScheme::Literal
    };
    let correlation_mode = if computed_correlation {
        CorrelationMode::Computed
    } else {
        CorrelationMode::Literal
    };

    eprintln!("Optimizing {} assets ({} profile)", assets.len(), tolerance);
    let allocation = PortfolioOptimizer::with_modes(weight_scheme, correlation_mode)
        .optimize(&assets, tolerance, amount)?;

    match format {
        OutputFormat::Json => println!("{}", to_json(&allocation)?),
        OutputFormat::Text => print_allocation(&allocation),
    }
    Ok(())
}

pub fn run_list_symbols(config_path: &Path) -> Result<(), MarketlensError> {
    let config = load_config(config_path)?;
    let data = data_adapter(&config)?;

    let symbols = data.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No data files found");
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

pub fn run_info(config_path: &Path, symbol: &str) -> Result<(), MarketlensError> {
    let config = load_config(config_path)?;
    let data = data_adapter(&config)?;

    let symbol = symbol.trim().to_uppercase();
    match data.data_range(&symbol)? {
        Some((min_date, max_date, count)) => {
            println!("{}: {} bars, {} to {}", symbol, count, min_date, max_date);
        }
        None => {
            eprintln!("{}: no data found", symbol);
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, MarketlensError> {
    serde_json::to_string_pretty(value).map_err(|e| MarketlensError::Data {
        reason: format!("serialization failed: {e}"),
    })
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

fn fmt_opt_wide(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.0}"),
        None => "n/a".to_string(),
    }
}

fn print_report(report: &IndicatorReport) {
    let s = &report.summary;
    println!("=== {} Technical Analysis ===", report.symbol);
    println!("As of {}", s.as_of);
    println!();
    println!("Summary");
    println!("  Price:              {:.2}", s.current_price);
    match (s.change, s.change_percent) {
        (Some(chg), Some(pct)) => println!("  Change:             {:+.2} ({:+.2}%)", chg, pct),
        (Some(chg), None) => println!("  Change:             {:+.2}", chg),
        _ => println!("  Change:             n/a"),
    }
    println!(
        "  52-Week Range:      {:.2} - {:.2}",
        s.low_52_week, s.high_52_week
    );
    println!("  Range Position:     {:.1}%", s.price_position);
    println!("  Avg Volume:         {:.0}", s.avg_volume);

    let t = &report.trend;
    println!();
    println!("Trend");
    println!(
        "  Short/Medium/Long:  {} / {} / {}",
        t.short_term, t.medium_term, t.long_term
    );
    println!(
        "  SMA 20/50/200:      {} / {} / {}",
        fmt_opt(t.sma_20),
        fmt_opt(t.sma_50),
        fmt_opt(t.sma_200)
    );
    println!(
        "  EMA 12/26:          {} / {}",
        fmt_opt(t.ema_12),
        fmt_opt(t.ema_26)
    );
    println!(
        "  MACD:               {} (signal {}, histogram {})",
        fmt_opt(t.macd),
        fmt_opt(t.macd_signal),
        fmt_opt(t.macd_histogram)
    );

    let m = &report.momentum;
    println!();
    println!("Momentum");
    println!("  RSI(14):            {} ({})", fmt_opt(m.rsi), m.rsi_signal);
    println!(
        "  Stochastic %K/%D:   {} / {} ({})",
        fmt_opt(m.stochastic_k),
        fmt_opt(m.stochastic_d),
        m.stochastic_signal
    );
    println!("  Williams %R:        {}", fmt_opt(m.williams_r));
    println!("  CCI(20):            {}", fmt_opt(m.cci));

    let v = &report.volatility;
    println!();
    println!("Volatility");
    println!(
        "  Bollinger U/M/L:    {} / {} / {}",
        fmt_opt(v.bollinger_upper),
        fmt_opt(v.bollinger_middle),
        fmt_opt(v.bollinger_lower)
    );
    println!(
        "  Band Width / %B:    {} / {}",
        fmt_opt(v.bollinger_width),
        fmt_opt(v.bollinger_percent_b)
    );
    println!("  ATR(14):            {}", fmt_opt(v.atr));
    match (v.historical_volatility, v.volatility_regime) {
        (Some(hv), Some(regime)) => println!("  Hist Vol (ann.):    {:.1}% ({})", hv, regime),
        _ => println!("  Hist Vol (ann.):    n/a"),
    }

    let vol = &report.volume;
    println!();
    println!("Volume");
    println!("  Current:            {:.0}", vol.current_volume);
    println!("  20-day SMA:         {}", fmt_opt_wide(vol.volume_sma));
    println!(
        "  Ratio:              {:.2}x ({})",
        vol.volume_ratio, vol.volume_signal
    );
    println!("  OBV:                {}", fmt_opt_wide(vol.obv));
    match vol.volume_roc {
        Some(roc) => println!("  Volume ROC:         {:+.1}%", roc),
        None => println!("  Volume ROC:         n/a"),
    }
    println!(
        "  Accum/Dist:         {}",
        fmt_opt_wide(vol.accumulation_distribution)
    );

    let sr = &report.support_resistance;
    println!();
    println!("Support / Resistance");
    println!(
        "  Pivot:              {:.2} (R1 {:.2}, R2 {:.2}, S1 {:.2}, S2 {:.2})",
        sr.pivot, sr.resistance_1, sr.resistance_2, sr.support_1, sr.support_2
    );
    println!("  Nearest Support:    {}", fmt_opt(sr.nearest_support));
    println!("  Nearest Resistance: {}", fmt_opt(sr.nearest_resistance));

    let detected: Vec<_> = report.patterns.iter().filter(|p| p.detected).collect();
    println!();
    println!("Patterns");
    if detected.is_empty() {
        println!("  none detected");
    } else {
        for p in detected {
            println!("  {} (confidence {:.2})", p.name, p.confidence);
        }
    }

    let sig = &report.signals;
    println!();
    println!("Signals: {}", sig.overall_signal);
    for b in &sig.buy_signals {
        println!("  + {b}");
    }
    for s in &sig.sell_signals {
        println!("  - {s}");
    }

    let r = &report.risk;
    println!();
    println!("Risk");
    println!("  Volatility (ann.):  {:.1}%", r.volatility * 100.0);
    println!("  Sharpe Ratio:       {:.2}", r.sharpe_ratio);
    match (r.var_95, r.var_99) {
        (Some(v95), Some(v99)) => println!(
            "  VaR 95/99:          {:.2}% / {:.2}%",
            v95 * 100.0,
            v99 * 100.0
        ),
        _ => println!("  VaR 95/99:          n/a"),
    }
    println!("  Max Drawdown:       {:.1}%", r.max_drawdown * 100.0);
}

fn print_scenario(label: &str, scenario: &Scenario) {
    println!(
        "  {:<5} p={:.2}, return {:+.0}%, drivers: {}",
        label,
        scenario.probability,
        scenario.expected_return * 100.0,
        scenario.key_drivers.join(", ")
    );
}

fn print_prediction(prediction: &Prediction) {
    println!(
        "=== {} Forecast ({}) ===",
        prediction.symbol, prediction.horizon
    );

    let p = &prediction.price;
    println!();
    println!("Price");
    println!("  Expected Return:    {:+.2}%", p.predicted_return * 100.0);
    println!(
        "  Models (RF/GB/LIN): {:+.2}% / {:+.2}% / {:+.2}%",
        p.model_outputs.random_forest * 100.0,
        p.model_outputs.gradient_boost * 100.0,
        p.model_outputs.linear_model * 100.0
    );
    println!("  Confidence:         {:.2}", p.confidence);

    let t = &prediction.trend;
    println!();
    println!("Trend");
    println!(
        "  Direction:          {} (p(up) = {:.2})",
        t.direction, t.probability
    );
    println!("  Strength:           {:.2}", t.strength);

    let v = &prediction.volatility;
    println!();
    println!("Volatility");
    println!("  Forecast (daily):   {:.2}%", v.forecast * 100.0);
    println!("  Regime:             {} ({})", v.regime, v.trend);

    let r = &prediction.risk;
    println!();
    println!("Risk: {} (score {:.2})", r.level, r.overall_score);
    println!("  Volatility:         {}", r.volatility_risk);
    println!("  Price Level:        {}", r.price_level_risk);
    println!("  Macro:              {:.2}", r.macro_risk);
    println!("  Liquidity:          {}", r.liquidity_risk);
    println!("  Concentration:      {}", r.concentration_risk);
    for s in &r.mitigation_suggestions {
        println!("  * {s}");
    }

    println!();
    println!("Scenarios ({})", prediction.scenarios.base_case.timeframe);
    print_scenario("Bull:", &prediction.scenarios.bull_case);
    print_scenario("Base:", &prediction.scenarios.base_case);
    print_scenario("Bear:", &prediction.scenarios.bear_case);

    let c = &prediction.confidence;
    println!();
    println!("Confidence: {} ({:.2})", c.level, c.overall);
    println!("  Data Quality:       {:.2}", c.data_quality);
    println!("  Feature Stability:  {:.2}", c.feature_stability);
    println!("  Model Agreement:    {:.2}", c.model_agreement);

    println!();
    println!("Key Factors");
    for f in &prediction.key_factors {
        println!(
            "  {} [{}/{}]: {}",
            f.factor, f.impact, f.strength, f.description
        );
    }
}

fn print_allocation(allocation: &Allocation) {
    println!(
        "=== Portfolio Allocation ({} profile) ===",
        allocation.risk_profile
    );
    println!();
    println!("Total Investment:     ${:.2}", allocation.total_investment);
    println!();
    println!("Weights");
    for (symbol, weight) in &allocation.weights {
        println!(
            "  {}: {:.1}% (${:.2})",
            symbol,
            weight * 100.0,
            allocation.dollar_amounts[symbol]
        );
    }
    let allocated: f64 = allocation.weights.values().sum();
    if (allocated - 1.0).abs() > 1e-9 {
        println!("  unallocated: {:.1}%", (1.0 - allocated) * 100.0);
    }

    println!();
    println!("Asset Statistics");
    for (symbol, stats) in &allocation.asset_statistics {
        println!(
            "  {}: return {:+.1}%, vol {:.1}%, sharpe {:.2}, drawdown {:.1}%, corr {:.2}",
            symbol,
            stats.expected_return * 100.0,
            stats.volatility * 100.0,
            stats.sharpe_ratio,
            stats.max_drawdown * 100.0,
            stats.correlation
        );
    }

    let m = &allocation.metrics;
    println!();
    println!("Portfolio Metrics");
    println!("  Expected Return:    {:+.1}%", m.expected_return * 100.0);
    println!("  Expected Vol:       {:.1}%", m.expected_volatility * 100.0);
    println!("  Sharpe Ratio:       {:.2}", m.sharpe_ratio);
    println!("  Diversification:    {:.2}", m.diversification_score);

    println!();
    println!("Recommendations");
    for r in &allocation.recommendations {
        println!("  * {r}");
    }
}
