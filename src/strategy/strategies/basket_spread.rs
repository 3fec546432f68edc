use crate::{
    strategy::{
        product_context::ProductContext,
        signal_strategy::{Signal, SignalSource},
        strategy_helpers::mid_price,
    },
    types::trading_state::TradingState,
};

pub const GIFT_BASKET: &str = "GIFT_BASKET";

/// Contents of one gift basket.
pub const BASKET_CONTENTS: &[(&str, f64)] =
    &[("CHOCOLATE", 4.0), ("STRAWBERRIES", 6.0), ("ROSES", 1.0)];

/// Maps the basket premium over its contents to a signal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BasketRule {
    /// Long below `long`, short above `short`.
    Absolute { long: f64, short: f64 },
    /// Long below `premium * (1 - band)`, short above `premium * (1 + band)`.
    PremiumBand { premium: f64, band: f64 },
}

impl BasketRule {
    pub fn classify(&self, diff: f64) -> Option<Signal> {
        let (long, short) = match *self {
            Self::Absolute { long, short } => (long, short),
            Self::PremiumBand { premium, band } => (premium * (1.0 - band), premium * (1.0 + band)),
        };

        if diff < long {
            Some(Signal::Long)
        } else if diff > short {
            Some(Signal::Short)
        } else {
            None
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BasketSpreadSignal {
    pub rule: BasketRule,
}

impl BasketSpreadSignal {
    pub fn new(rule: BasketRule) -> Self {
        Self { rule }
    }

    /// Basket mid minus the mids of its contents, `None` unless every book is two-sided.
    pub fn premium(state: &TradingState) -> Option<f64> {
        let basket = mid_price(state, GIFT_BASKET).ok()?;
        let mut contents = 0.0;
        for (symbol, weight) in BASKET_CONTENTS {
            contents += weight * mid_price(state, symbol).ok()?;
        }
        Some(basket - contents)
    }
}

impl SignalSource for BasketSpreadSignal {
    fn signal(&mut self, _ctx: &ProductContext, state: &TradingState) -> Option<Signal> {
        let diff = Self::premium(state)?;
        self.rule.classify(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        strategy::{
            Strategy,
            signal_strategy::{SignalMode, SignalStrategy},
        },
        types::{order::Order, order_depth::OrderDepth},
    };

    fn book(mid: i64) -> OrderDepth {
        OrderDepth::new([(mid - 1, 10)], [(mid + 1, -10)])
    }

    fn make_state(basket: i64) -> TradingState {
        TradingState::new(0)
            .with_order_depth("CHOCOLATE", book(100))
            .with_order_depth("STRAWBERRIES", book(50))
            .with_order_depth("ROSES", book(200))
            .with_order_depth(GIFT_BASKET, book(basket))
    }

    #[test]
    fn test_premium_over_contents() {
        assert_eq!(BasketSpreadSignal::premium(&make_state(1_080)), Some(180.0));
    }

    #[test]
    fn test_missing_component_gives_no_signal() {
        let state = TradingState::new(0)
            .with_order_depth("CHOCOLATE", book(100))
            .with_order_depth(GIFT_BASKET, book(1_080));
        let mut source =
            BasketSpreadSignal::new(BasketRule::Absolute { long: 230.0, short: 355.0 });
        assert_eq!(source.signal(&ProductContext::new("CHOCOLATE", 250), &state), None);
    }

    #[test]
    fn test_absolute_rule() {
        let rule = BasketRule::Absolute { long: 230.0, short: 355.0 };
        assert_eq!(rule.classify(180.0), Some(Signal::Long));
        assert_eq!(rule.classify(230.0), None);
        assert_eq!(rule.classify(355.5), Some(Signal::Short));
    }

    #[test]
    fn test_premium_band_rule() {
        let rule = BasketRule::PremiumBand { premium: 350.0, band: 0.05 };
        assert_eq!(rule.classify(332.0), Some(Signal::Long));
        assert_eq!(rule.classify(350.0), None);
        assert_eq!(rule.classify(368.0), Some(Signal::Short));
    }

    #[test]
    fn test_long_signal_buys_remaining_capacity_at_best_ask() {
        let source = BasketSpreadSignal::new(BasketRule::Absolute { long: 230.0, short: 355.0 });
        let mut strategy = SignalStrategy::new("CHOCOLATE", 250, source, SignalMode::Persistent);
        let state = make_state(1_080).with_position("CHOCOLATE", 230);

        let output = strategy.run(&state).unwrap();

        assert_eq!(strategy.signal(), Signal::Long);
        assert_eq!(output.orders, vec![Order::new("CHOCOLATE", 101, 20)]);
    }
}
