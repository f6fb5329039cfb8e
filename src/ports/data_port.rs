//! Price history access port.

use crate::domain::error::MarketlensError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` within `[start_date, end_date]`, ordered by
    /// date. Unknown symbols are an error; an empty range is not.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketlensError>;

    fn list_symbols(&self) -> Result<Vec<String>, MarketlensError>;

    /// First date, last date and bar count for `symbol`, or `None`
    /// when the symbol has no data.
    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MarketlensError>;
}
