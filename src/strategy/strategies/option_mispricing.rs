use crate::{
    signals::black_scholes::black_scholes_call,
    strategy::{
        product_context::ProductContext,
        signal_strategy::{Signal, SignalSource},
        strategy_helpers::mid_price,
    },
    types::trading_state::TradingState,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OptionParams {
    pub underlying: String,
    pub strike: f64,
    /// Years to expiry.
    pub expiry: f64,
    pub rate: f64,
    pub volatility: f64,
    /// How far the option mid must stray from fair before trading.
    pub edge: f64,
}

impl OptionParams {
    /// Volatility calibrated to the opening coupon price of round 5.
    pub fn round5() -> Self {
        Self {
            underlying: "COCONUT".to_string(),
            strike: 10_000.0,
            expiry: 245.0 / 365.0,
            rate: 0.0,
            volatility: 0.193_785,
            edge: 2.0,
        }
    }

    pub fn round4() -> Self {
        Self {
            expiry: 246.0 / 365.0,
            volatility: 0.194_962,
            ..Self::round5()
        }
    }

    pub fn fair_value(&self, spot: f64) -> f64 {
        black_scholes_call(spot, self.strike, self.expiry, self.rate, self.volatility)
    }
}

/// Trades a call against its Black-Scholes value on the underlying mid.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionMispricingSignal {
    pub params: OptionParams,
}

impl OptionMispricingSignal {
    pub fn new(params: OptionParams) -> Self {
        Self { params }
    }
}

impl SignalSource for OptionMispricingSignal {
    fn signal(&mut self, ctx: &ProductContext, state: &TradingState) -> Option<Signal> {
        let spot = mid_price(state, &self.params.underlying).ok()?;
        let option = mid_price(state, ctx.symbol()).ok()?;
        let fair = self.params.fair_value(spot);

        if option > fair + self.params.edge {
            Some(Signal::Short)
        } else if option < fair - self.params.edge {
            Some(Signal::Long)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order_depth::OrderDepth;

    fn make_state(coupon_mid: i64) -> TradingState {
        TradingState::new(0)
            .with_order_depth("COCONUT", OrderDepth::new([(9_999, 100)], [(10_001, -100)]))
            .with_order_depth(
                "COCONUT_COUPON",
                OrderDepth::new([(coupon_mid - 1, 50)], [(coupon_mid + 1, -50)]),
            )
    }

    #[test]
    fn test_mispricing_bands() {
        let ctx = ProductContext::new("COCONUT_COUPON", 600);
        let mut source = OptionMispricingSignal::new(OptionParams::round5());
        let fair = OptionParams::round5().fair_value(10_000.0).round() as i64;

        assert_eq!(source.signal(&ctx, &make_state(fair + 10)), Some(Signal::Short));
        assert_eq!(source.signal(&ctx, &make_state(fair - 10)), Some(Signal::Long));
        assert_eq!(source.signal(&ctx, &make_state(fair)), None);
    }

    #[test]
    fn test_needs_underlying_book() {
        let ctx = ProductContext::new("COCONUT_COUPON", 600);
        let mut source = OptionMispricingSignal::new(OptionParams::round4());
        let state = TradingState::new(0)
            .with_order_depth("COCONUT_COUPON", OrderDepth::new([(630, 5)], [(632, -5)]));
        assert_eq!(source.signal(&ctx, &state), None);
    }
}
