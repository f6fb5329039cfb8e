//! Static macroeconomic context adapter.
//!
//! The macro backdrop is a pinned snapshot rather than a live feed;
//! `[macro]` config keys override individual fields for scenario runs.

use crate::domain::error::MarketlensError;
use crate::domain::macro_context::MacroContext;
use crate::ports::config_port::ConfigPort;
use crate::ports::macro_port::MacroPort;

pub struct StaticMacroAdapter {
    context: MacroContext,
}

impl StaticMacroAdapter {
    pub fn new() -> Self {
        Self {
            context: MacroContext::default(),
        }
    }

    /// Snapshot defaults with any `[macro]` keys applied over them.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = MacroContext::default();
        let context = MacroContext {
            market_regime: config
                .get_string("macro", "market_regime")
                .unwrap_or(defaults.market_regime),
            economic_cycle: config
                .get_string("macro", "economic_cycle")
                .unwrap_or(defaults.economic_cycle),
            risk_sentiment: config
                .get_string("macro", "risk_sentiment")
                .unwrap_or(defaults.risk_sentiment),
            fed_funds_rate: config.get_double("macro", "fed_funds_rate", defaults.fed_funds_rate),
            cpi: config.get_double("macro", "cpi", defaults.cpi),
            unemployment_rate: config.get_double(
                "macro",
                "unemployment_rate",
                defaults.unemployment_rate,
            ),
            geopolitical_risk: config.get_double(
                "macro",
                "geopolitical_risk",
                defaults.geopolitical_risk,
            ),
        };
        Self { context }
    }
}

impl Default for StaticMacroAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroPort for StaticMacroAdapter {
    fn current_context(&self) -> Result<MacroContext, MarketlensError> {
        Ok(self.context.clone())
    }
}
