use anyhow::{Context, Result};
use serde_json::Value;

use crate::{
    signals::liquidation_window::LiquidationWindow,
    strategy::{
        product_context::{ProductContext, WithContext},
        strategy::{OrderSink, SkipReason, Strategy},
        strategy_helpers::StrategyHelpers,
    },
    types::{Price, Quantity, order_depth::OrderDepth, trading_state::TradingState},
};

/// Where a market maker centres its quotes.
pub trait FairValue {
    fn true_value(&self, depth: &OrderDepth) -> Option<Price>;
}

/// A product pegged to a known constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFairValue(pub Price);

impl FairValue for FixedFairValue {
    fn true_value(&self, _depth: &OrderDepth) -> Option<Price> {
        Some(self.0)
    }
}

/// Popular-level mid, rounded half to even.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MidPriceFairValue;

impl FairValue for MidPriceFairValue {
    fn true_value(&self, depth: &OrderDepth) -> Option<Price> {
        depth.mid_price().map(|mid| mid.round_ties_even() as Price)
    }
}

/// Takes everything mispriced against the fair value, then rests the remaining
/// capacity one tick inside the popular levels. Positions stuck at the limit
/// are worked off at or near the fair value.
#[derive(Debug, Clone)]
pub struct MarketMakingStrategy<F: FairValue> {
    ctx: ProductContext,
    fair_value: F,
    window: LiquidationWindow,

    /// Distance from fair value of the soft-liquidation quote.
    pub soft_liquidation_offset: Price,
}

impl<F: FairValue> MarketMakingStrategy<F> {
    pub fn new(symbol: &str, limit: Quantity, fair_value: F) -> Self {
        Self {
            ctx: ProductContext::new(symbol, limit),
            fair_value,
            window: LiquidationWindow::default(),
            soft_liquidation_offset: 2,
        }
    }

    pub fn window(&self) -> &LiquidationWindow {
        &self.window
    }
}

impl MarketMakingStrategy<FixedFairValue> {
    pub fn fixed(symbol: &str, limit: Quantity, true_value: Price) -> Self {
        Self::new(symbol, limit, FixedFairValue(true_value))
    }
}

impl MarketMakingStrategy<MidPriceFairValue> {
    pub fn mid_price(symbol: &str, limit: Quantity) -> Self {
        Self::new(symbol, limit, MidPriceFairValue)
    }
}

impl<F: FairValue> WithContext for MarketMakingStrategy<F> {
    fn ctx(&self) -> &ProductContext {
        &self.ctx
    }
}

impl<F: FairValue> Strategy for MarketMakingStrategy<F> {
    fn act(&mut self, state: &TradingState, sink: &mut OrderSink) -> Result<(), SkipReason> {
        let depth = self.own_depth(state)?;
        let true_value = self
            .fair_value
            .true_value(depth)
            .ok_or(SkipReason::MissingFairValue)?;
        let popular_bid = depth.popular_bid().ok_or(SkipReason::MissingTopOfBook)?;
        let popular_ask = depth.popular_ask().ok_or(SkipReason::MissingTopOfBook)?;

        let limit = self.ctx().limit();
        let position = self.position(state);
        let mut to_buy = self.buy_capacity(position);
        let mut to_sell = self.sell_capacity(position);

        self.window.push(position.abs() == limit);
        let soft_liquidate = self.window.soft_liquidate();
        let hard_liquidate = self.window.hard_liquidate();

        // Lean against inventory past half the limit.
        let max_buy_price = if position * 2 > limit { true_value - 1 } else { true_value };
        let min_sell_price = if position * 2 < -limit { true_value + 1 } else { true_value };

        for (price, volume) in depth.asks() {
            if to_buy > 0 && price <= max_buy_price {
                let quantity = to_buy.min(-volume);
                sink.buy(price, quantity);
                to_buy -= quantity;
            }
        }

        if to_buy > 0 && hard_liquidate {
            let quantity = to_buy / 2;
            sink.buy(true_value, quantity);
            to_buy -= quantity;
        }

        if to_buy > 0 && soft_liquidate {
            let quantity = to_buy / 2;
            sink.buy(true_value - self.soft_liquidation_offset, quantity);
            to_buy -= quantity;
        }

        if to_buy > 0 {
            sink.buy(max_buy_price.min(popular_bid + 1), to_buy);
        }

        for (price, volume) in depth.bids() {
            if to_sell > 0 && price >= min_sell_price {
                let quantity = to_sell.min(volume);
                sink.sell(price, quantity);
                to_sell -= quantity;
            }
        }

        if to_sell > 0 && hard_liquidate {
            let quantity = to_sell / 2;
            sink.sell(true_value, quantity);
            to_sell -= quantity;
        }

        if to_sell > 0 && soft_liquidate {
            let quantity = to_sell / 2;
            sink.sell(true_value + self.soft_liquidation_offset, quantity);
            to_sell -= quantity;
        }

        if to_sell > 0 {
            sink.sell(min_sell_price.max(popular_ask - 1), to_sell);
        }

        Ok(())
    }

    fn save(&self) -> Value {
        Value::from(self.window.to_pins())
    }

    fn load(&mut self, state: Value) -> Result<()> {
        let pins: Vec<bool> = serde_json::from_value(state)
            .context("liquidation window must be an array of booleans")?;
        self.window = LiquidationWindow::from_pins(pins, LiquidationWindow::DEFAULT_CAPACITY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order::Order;

    fn make_state(position: Quantity, depth: OrderDepth) -> TradingState {
        TradingState::new(100)
            .with_order_depth("AMETHYSTS", depth)
            .with_position("AMETHYSTS", position)
    }

    fn net_fill(orders: &[Order], buy: bool) -> Quantity {
        orders
            .iter()
            .filter(|order| (order.quantity > 0) == buy)
            .map(|order| order.quantity.abs())
            .sum()
    }

    #[test]
    fn test_takes_cheap_asks_then_rests_remainder() {
        let mut strategy = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        let state = make_state(0, OrderDepth::new([(10_001, 4)], [(9_998, -5), (9_999, -3)]));

        let output = strategy.run(&state).unwrap();

        assert_eq!(
            output.orders,
            vec![
                Order::new("AMETHYSTS", 9_998, 5),
                Order::new("AMETHYSTS", 9_999, 3),
                Order::new("AMETHYSTS", 10_000, 12),
                Order::new("AMETHYSTS", 10_001, -4),
                Order::new("AMETHYSTS", 10_000, -16),
            ]
        );
        assert_eq!(output.conversions, 0);
    }

    #[test]
    fn test_orders_respect_limit_from_any_position() {
        let depth = OrderDepth::new(
            [(10_002, 7), (9_998, 20), (9_996, 30)],
            [(9_999, -9), (10_002, -20), (10_004, -30)],
        );
        for position in [-20, -13, -10, 0, 9, 11, 20] {
            let mut strategy = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
            let output = strategy.run(&make_state(position, depth.clone())).unwrap();

            assert!(position + net_fill(&output.orders, true) <= 20);
            assert!(position - net_fill(&output.orders, false) >= -20);
        }
    }

    #[test]
    fn test_leans_against_large_long_position() {
        let mut strategy = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        let state = make_state(15, OrderDepth::new([(9_995, 10)], [(10_000, -10)]));

        let output = strategy.run(&state).unwrap();

        // Ask at fair value is not taken, bid capped at fair - 1.
        assert_eq!(output.orders[0], Order::new("AMETHYSTS", 9_996, 5));
    }

    #[test]
    fn test_hard_liquidation_after_ten_pinned_ticks() {
        let mut strategy = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        let state = make_state(20, OrderDepth::new([(9_998, 5)], [(10_002, -5)]));

        for _ in 0..9 {
            strategy.run(&state).unwrap();
        }
        let output = strategy.run(&state).unwrap();

        assert_eq!(
            output.orders,
            vec![
                Order::new("AMETHYSTS", 10_000, -20),
                Order::new("AMETHYSTS", 10_002, -10),
                Order::new("AMETHYSTS", 10_001, -10),
            ]
        );
    }

    #[test]
    fn test_mid_price_fair_value_rounds_half_to_even() {
        let even = OrderDepth::new([(4_999, 10)], [(5_002, -10)]);
        let odd = OrderDepth::new([(5_000, 10)], [(5_003, -10)]);
        assert_eq!(MidPriceFairValue.true_value(&even), Some(5_000));
        assert_eq!(MidPriceFairValue.true_value(&odd), Some(5_002));
    }

    #[test]
    fn test_skips_one_sided_book() {
        let mut strategy = MarketMakingStrategy::mid_price("AMETHYSTS", 20);
        let state = make_state(0, OrderDepth::new([(9_998, 5)], []));

        assert_eq!(
            strategy.run(&state),
            Err(SkipReason::OneSidedBook("AMETHYSTS".to_string()))
        );
        assert!(strategy.window().is_empty());
    }

    #[test]
    fn test_save_load_preserves_behaviour() {
        let state = make_state(20, OrderDepth::new([(9_998, 5)], [(10_002, -5)]));
        let mut original = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        for _ in 0..9 {
            original.run(&state).unwrap();
        }

        let mut restored = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        restored.load(original.save()).unwrap();

        assert_eq!(restored.save(), original.save());
        assert_eq!(restored.run(&state), original.run(&state));
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let mut strategy = MarketMakingStrategy::fixed("AMETHYSTS", 20, 10_000);
        assert!(strategy.load(serde_json::json!({"window": 3})).is_err());
        assert!(strategy.window().is_empty());
    }
}
