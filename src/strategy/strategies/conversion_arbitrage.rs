use crate::{
    strategy::{
        product_context::{ProductContext, WithContext},
        strategy::{OrderSink, SkipReason, Strategy},
        strategy_helpers::StrategyHelpers,
    },
    types::{Price, Quantity, observation::ConversionObservation, trading_state::TradingState},
};

/// Sells on the local book above the cost of importing, then converts the
/// resulting short away on the next tick.
#[derive(Debug, Clone)]
pub struct ConversionArbitrageStrategy {
    ctx: ProductContext,
}

impl ConversionArbitrageStrategy {
    pub fn new(symbol: &str, limit: Quantity) -> Self {
        Self {
            ctx: ProductContext::new(symbol, limit),
        }
    }

    /// Lowest price worth selling at: just under the foreign bid, never below import cost.
    pub fn sell_price(observation: &ConversionObservation) -> Price {
        let under_bid = (observation.bid_price - 0.5).trunc() as Price;
        let over_cost = (observation.import_cost() + 1.0).trunc() as Price;
        under_bid.max(over_cost)
    }
}

impl WithContext for ConversionArbitrageStrategy {
    fn ctx(&self) -> &ProductContext {
        &self.ctx
    }
}

impl Strategy for ConversionArbitrageStrategy {
    fn act(&mut self, state: &TradingState, sink: &mut OrderSink) -> Result<(), SkipReason> {
        let position = self.position(state);
        sink.convert(-position);

        if let Some(observation) = state.observations.conversion(self.ctx().symbol()) {
            sink.sell(Self::sell_price(observation), self.ctx().limit());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order::Order;

    fn make_observation(bid_price: f64, ask_price: f64) -> ConversionObservation {
        ConversionObservation {
            bid_price,
            ask_price,
            transport_fees: 0.9,
            export_tariff: 9.5,
            import_tariff: -5.0,
            sunlight: 2_500.0,
            humidity: 79.0,
        }
    }

    #[test]
    fn test_converts_position_and_sells_limit() {
        let mut strategy = ConversionArbitrageStrategy::new("ORCHIDS", 100);
        let mut state = TradingState::new(0).with_position("ORCHIDS", 40);
        state
            .observations
            .conversion_observations
            .insert("ORCHIDS".to_string(), make_observation(1_100.0, 1_101.5));

        let output = strategy.run(&state).unwrap();

        // import cost 1097.4, so the bid-side price 1099 wins
        assert_eq!(output.conversions, -40);
        assert_eq!(output.orders, vec![Order::new("ORCHIDS", 1_099, -100)]);
    }

    #[test]
    fn test_sell_price_floors_at_import_cost() {
        let observation = make_observation(1_000.0, 1_010.2);
        // 1010.2 + 0.9 - 5.0 + 1 = 1007.1
        assert_eq!(ConversionArbitrageStrategy::sell_price(&observation), 1_007);
    }

    #[test]
    fn test_without_observation_only_converts() {
        let mut strategy = ConversionArbitrageStrategy::new("ORCHIDS", 100);
        let state = TradingState::new(0).with_position("ORCHIDS", -15);

        let output = strategy.run(&state).unwrap();

        assert_eq!(output.conversions, 15);
        assert!(output.orders.is_empty());
    }
}
