//! Macroeconomic context port.

use crate::domain::error::MarketlensError;
use crate::domain::macro_context::MacroContext;

pub trait MacroPort {
    /// The macro backdrop to feed into feature engineering.
    fn current_context(&self) -> Result<MacroContext, MarketlensError>;
}
