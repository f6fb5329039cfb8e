//! Feature engineering for the prediction models.
//!
//! [`FeaturePipeline::build`] turns a price history plus a macro
//! snapshot into a [`FeatureTable`]: one row per bar with every
//! feature defined, leading warm-up rows dropped. Macro values are
//! broadcast once as constant columns. Dates, closes and volumes ride
//! along per retained row so target construction can re-align against
//! the originals.

use chrono::{Datelike, NaiveDate};

use crate::domain::error::MarketlensError;
use crate::domain::indicator::ema::ema;
use crate::domain::indicator::macd::macd_default;
use crate::domain::indicator::rolling::{lag, pct_change, rolling_std, sma};
use crate::domain::indicator::rsi::rsi;
use crate::domain::indicator::volume::volume_ratio;
use crate::domain::macro_context::MacroContext;
use crate::domain::ohlcv::PriceSeries;

/// Minimum usable rows for any downstream model fit.
pub const MIN_FEATURE_ROWS: usize = 100;

/// Column names in table order.
pub const FEATURE_NAMES: [&str; 46] = [
    "price_change",
    "price_change_5d",
    "price_change_20d",
    "sma_5",
    "sma_20",
    "sma_50",
    "ema_12",
    "ema_26",
    "price_vs_sma_20",
    "price_vs_sma_50",
    "volatility_5d",
    "volatility_20d",
    "volume_change",
    "volume_sma_20",
    "volume_ratio",
    "rsi",
    "macd",
    "macd_signal",
    "macd_histogram",
    "market_regime",
    "economic_cycle",
    "risk_sentiment",
    "fed_rate",
    "inflation_rate",
    "unemployment_rate",
    "day_of_week",
    "month",
    "quarter",
    "year",
    "is_monday",
    "is_friday",
    "is_month_end",
    "is_quarter_end",
    "price_change_lag_1",
    "price_change_lag_2",
    "price_change_lag_3",
    "price_change_lag_5",
    "price_change_lag_10",
    "volume_change_lag_1",
    "volume_change_lag_2",
    "volume_change_lag_3",
    "volume_change_lag_5",
    "volume_change_lag_10",
    "price_rolling_mean_5",
    "price_rolling_std_5",
    "volume_rolling_mean_5",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Fully-defined feature rows plus the raw date/close/volume of each
/// retained bar.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
    volumes: Vec<f64>,
    // row-major, FEATURE_COUNT values per row
    data: Vec<f64>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * FEATURE_COUNT..(index + 1) * FEATURE_COUNT]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(FEATURE_COUNT)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    pub fn column_index(name: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|n| *n == name)
    }

    /// Extracts one named column. `None` for an unknown name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = Self::column_index(name)?;
        Some(self.rows().map(|row| row[idx]).collect())
    }
}

pub struct FeaturePipeline;

impl FeaturePipeline {
    /// Builds the feature table for `series` under `macro_context`.
    ///
    /// Fails with `InsufficientData` when fewer than
    /// [`MIN_FEATURE_ROWS`] fully-defined rows survive warm-up
    /// dropping.
    pub fn build(
        series: &PriceSeries,
        macro_context: &MacroContext,
    ) -> Result<FeatureTable, MarketlensError> {
        let n = series.len();
        let closes = series.closes();
        let volumes = series.volumes();
        let dates = series.dates();

        let price_change = pct_change(&closes, 1);
        let volume_change = pct_change(&volumes, 1);
        let sma_5 = sma(&closes, 5);
        let sma_20 = sma(&closes, 20);
        let sma_50 = sma(&closes, 50);
        let volume_sma_20 = sma(&volumes, 20);
        let macd = macd_default(&closes);

        let ratio_to = |values: &[f64], base: &[f64]| -> Vec<f64> {
            values
                .iter()
                .zip(base)
                .map(|(v, b)| if *b != 0.0 { v / b - 1.0 } else { f64::NAN })
                .collect()
        };

        let columns: Vec<Vec<f64>> = vec![
            price_change.clone(),
            pct_change(&closes, 5),
            pct_change(&closes, 20),
            sma_5.clone(),
            sma_20.clone(),
            sma_50.clone(),
            ema(&closes, 12),
            ema(&closes, 26),
            ratio_to(&closes, &sma_20),
            ratio_to(&closes, &sma_50),
            rolling_std(&price_change, 5),
            rolling_std(&price_change, 20),
            volume_change.clone(),
            volume_sma_20,
            volume_ratio(&volumes, 20),
            rsi(&closes, 14),
            macd.line,
            macd.signal,
            macd.histogram,
            vec![macro_context.regime_flag(); n],
            vec![macro_context.cycle_flag(); n],
            vec![macro_context.sentiment_flag(); n],
            vec![macro_context.fed_funds_rate; n],
            vec![macro_context.cpi; n],
            vec![macro_context.unemployment_rate; n],
            dates.iter().map(|d| day_of_week(d)).collect(),
            dates.iter().map(|d| d.month() as f64).collect(),
            dates.iter().map(|d| quarter(d)).collect(),
            dates.iter().map(|d| d.year() as f64).collect(),
            dates.iter().map(|d| flag(day_of_week(d) == 0.0)).collect(),
            dates.iter().map(|d| flag(day_of_week(d) == 4.0)).collect(),
            dates.iter().map(|d| flag(d.day() >= 25)).collect(),
            dates
                .iter()
                .map(|d| flag(d.month() % 3 == 0 && d.day() >= 25))
                .collect(),
            lag(&price_change, 1),
            lag(&price_change, 2),
            lag(&price_change, 3),
            lag(&price_change, 5),
            lag(&price_change, 10),
            lag(&volume_change, 1),
            lag(&volume_change, 2),
            lag(&volume_change, 3),
            lag(&volume_change, 5),
            lag(&volume_change, 10),
            sma_5,
            rolling_std(&closes, 5),
            sma(&volumes, 5),
        ];
        debug_assert_eq!(columns.len(), FEATURE_COUNT);

        let mut table = FeatureTable {
            dates: Vec::new(),
            closes: Vec::new(),
            volumes: Vec::new(),
            data: Vec::new(),
        };

        for i in 0..n {
            if columns.iter().all(|col| col[i].is_finite()) {
                table.dates.push(dates[i]);
                table.closes.push(closes[i]);
                table.volumes.push(volumes[i]);
                table.data.extend(columns.iter().map(|col| col[i]));
            }
        }

        if table.len() < MIN_FEATURE_ROWS {
            return Err(MarketlensError::InsufficientData {
                symbol: series.symbol().to_string(),
                rows: table.len(),
                minimum: MIN_FEATURE_ROWS,
            });
        }

        Ok(table)
    }
}

fn day_of_week(date: &NaiveDate) -> f64 {
    date.weekday().num_days_from_monday() as f64
}

fn quarter(date: &NaiveDate) -> f64 {
    ((date.month() + 2) / 3) as f64
}

fn flag(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn series_of(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.0),
                close,
                volume,
            })
            .collect();
        PriceSeries::new("FEAT", bars).unwrap()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.17).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn feature_names_are_unique_and_counted() {
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
        assert_eq!(FEATURE_COUNT, 46);
    }

    #[test]
    fn build_drops_exactly_the_warmup_rows() {
        let n = 200;
        let closes = wave(n);
        let volumes = vec![10_000.0; n];
        let series = series_of(&closes, &volumes);

        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();

        // binding warm-up is sma_50: first defined row is index 49
        assert_eq!(table.len(), n - 49);
        assert_eq!(
            table.dates()[0],
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Duration::days(49)
        );
    }

    #[test]
    fn all_retained_values_are_finite() {
        let n = 180;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();

        for row in table.rows() {
            assert_eq!(row.len(), FEATURE_COUNT);
            assert!(row.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn macro_columns_are_constant_broadcasts() {
        let n = 160;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let ctx = MacroContext::default();
        let table = FeaturePipeline::build(&series, &ctx).unwrap();

        let regime = table.column("market_regime").unwrap();
        let fed = table.column("fed_rate").unwrap();

        assert!(regime.iter().all(|v| *v == 1.0));
        assert!(fed.iter().all(|v| *v == ctx.fed_funds_rate));
    }

    #[test]
    fn macro_flags_follow_context() {
        let n = 160;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let ctx = MacroContext {
            market_regime: "bear_market".to_string(),
            ..MacroContext::default()
        };
        let table = FeaturePipeline::build(&series, &ctx).unwrap();

        let regime = table.column("market_regime").unwrap();
        assert!(regime.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn calendar_columns_match_dates() {
        let n = 160;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();

        let dow = table.column("day_of_week").unwrap();
        let is_monday = table.column("is_monday").unwrap();
        let quarter_col = table.column("quarter").unwrap();

        for (i, date) in table.dates().iter().enumerate() {
            assert_relative_eq!(dow[i], date.weekday().num_days_from_monday() as f64);
            assert_relative_eq!(is_monday[i], if dow[i] == 0.0 { 1.0 } else { 0.0 });
            assert_relative_eq!(quarter_col[i], ((date.month() + 2) / 3) as f64);
        }
    }

    #[test]
    fn too_few_rows_is_an_error() {
        // 148 bars leave 99 usable rows, one short of the minimum
        let n = 148;
        let series = series_of(&wave(n), &vec![5_000.0; n]);

        let err = FeaturePipeline::build(&series, &MacroContext::default()).unwrap_err();
        match err {
            MarketlensError::InsufficientData { rows, minimum, .. } => {
                assert_eq!(rows, 99);
                assert_eq!(minimum, MIN_FEATURE_ROWS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn minimum_row_count_exactly_met() {
        let n = 149;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();
        assert_eq!(table.len(), MIN_FEATURE_ROWS);
    }

    #[test]
    fn zero_volume_rows_are_dropped_with_their_lags() {
        let n = 200;
        let closes = wave(n);
        let mut volumes = vec![5_000.0; n];
        volumes[100] = 0.0;
        let series = series_of(&closes, &volumes);

        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();

        // volume_change is undefined at bar 101 (zero base) and that
        // NaN echoes through lags 1,2,3,5,10
        assert_eq!(table.len(), (n - 49) - 6);
    }

    #[test]
    fn unknown_column_is_none() {
        let n = 160;
        let series = series_of(&wave(n), &vec![5_000.0; n]);
        let table = FeaturePipeline::build(&series, &MacroContext::default()).unwrap();
        assert!(table.column("does_not_exist").is_none());
    }
}
