use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    logger::tick_logger::TickLogger,
    scenario::scenario::Scenario,
    strategy::Strategy,
    types::{Symbol, order::Order, order_depth::OrderDepth, trading_state::TradingState},
};

/// What a product's book must look like before its strategy is run.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum BookRequirement {
    /// Any book, even an empty one.
    Present,
    /// Resting orders on both sides.
    #[default]
    TwoSided,
}

impl BookRequirement {
    pub fn is_met(self, depth: Option<&OrderDepth>) -> bool {
        match (self, depth) {
            (_, None) => false,
            (Self::Present, Some(_)) => true,
            (Self::TwoSided, Some(depth)) => depth.is_two_sided(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraderOutput {
    pub orders: BTreeMap<Symbol, Vec<Order>>,
    pub conversions: i64,
    /// Compact JSON object, one entry per product.
    pub trader_data: String,
}

/// Owns one strategy per product and threads their state through `trader_data`.
pub struct Trader {
    strategies: Vec<(Symbol, Box<dyn Strategy>)>,
    book_requirement: BookRequirement,
}

impl Trader {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            strategies: scenario.build_strategies(),
            book_requirement: scenario.book_requirement,
        }
    }

    pub fn run(&mut self, state: &TradingState, logger: &mut TickLogger) -> TraderOutput {
        let mut previous = parse_trader_data(&state.trader_data);
        let mut output = TraderOutput::default();
        let mut next = Map::new();

        for (symbol, strategy) in self.strategies.iter_mut() {
            if let Some(saved) = previous.remove(symbol.as_str()) {
                if let Err(error) = strategy.load(saved) {
                    warn!(%symbol, "ignoring persisted state: {error:#}");
                }
            }

            if self.book_requirement.is_met(state.order_depth(symbol)) {
                match strategy.run(state) {
                    Ok(result) => {
                        output.conversions += result.conversions;
                        output.orders.insert(symbol.clone(), result.orders);
                    }
                    Err(reason) => {
                        debug!(%symbol, %reason, "strategy skipped");
                        logger.print(format!("{symbol} skipped: {reason}"));
                    }
                }
            }

            next.insert(symbol.clone(), strategy.save());
        }

        output.trader_data = Value::Object(next).to_string();
        output
    }
}

fn parse_trader_data(raw: &str) -> Map<String, Value> {
    if raw.is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(map) => map,
        Err(error) => {
            warn!("discarding malformed trader data: {error}");
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        scenario::{scenario::ScenarioEntry, strategies::StrategyKind},
        types::order_depth::OrderDepth,
    };

    fn make_scenario(requirement: BookRequirement) -> Scenario {
        Scenario::new(
            "test",
            vec![
                ScenarioEntry::new(
                    "AMETHYSTS",
                    20,
                    StrategyKind::FixedMarketMaker { true_value: 10_000 },
                ),
                ScenarioEntry::new("ORCHIDS", 100, StrategyKind::ConversionArbitrage),
            ],
            requirement,
        )
    }

    fn make_state(trader_data: &str) -> TradingState {
        TradingState::new(0)
            .with_trader_data(trader_data)
            .with_order_depth("AMETHYSTS", OrderDepth::new([(9_996, 10)], [(10_004, -10)]))
            .with_order_depth("ORCHIDS", OrderDepth::new([(1_100, 4)], []))
            .with_position("ORCHIDS", 7)
    }

    #[test]
    fn test_empty_trader_data_uses_defaults() {
        let mut trader = Trader::new(&make_scenario(BookRequirement::TwoSided));
        let output = trader.run(&make_state(""), &mut TickLogger::default());

        let saved: Value = serde_json::from_str(&output.trader_data).unwrap();
        assert_eq!(saved, json!({ "AMETHYSTS": [false], "ORCHIDS": null }));
        assert!(output.orders.contains_key("AMETHYSTS"));
    }

    #[test]
    fn test_book_requirement_gates_strategies() {
        let mut strict = Trader::new(&make_scenario(BookRequirement::TwoSided));
        let output = strict.run(&make_state(""), &mut TickLogger::default());
        assert!(!output.orders.contains_key("ORCHIDS"));
        assert_eq!(output.conversions, 0);

        let mut lenient = Trader::new(&make_scenario(BookRequirement::Present));
        let output = lenient.run(&make_state(""), &mut TickLogger::default());
        assert!(output.orders.contains_key("ORCHIDS"));
        assert_eq!(output.conversions, -7);
    }

    #[test]
    fn test_state_threads_between_ticks() {
        let mut trader = Trader::new(&make_scenario(BookRequirement::TwoSided));
        let first = trader.run(&make_state(""), &mut TickLogger::default());

        let mut fresh = Trader::new(&make_scenario(BookRequirement::TwoSided));
        let second = fresh.run(&make_state(&first.trader_data), &mut TickLogger::default());

        let saved: Value = serde_json::from_str(&second.trader_data).unwrap();
        assert_eq!(saved["AMETHYSTS"], json!([false, false]));
    }

    #[test]
    fn test_malformed_state_falls_back_to_defaults() {
        let mut trader = Trader::new(&make_scenario(BookRequirement::TwoSided));

        let output = trader.run(&make_state("not json"), &mut TickLogger::default());
        let saved: Value = serde_json::from_str(&output.trader_data).unwrap();
        assert_eq!(saved["AMETHYSTS"], json!([false]));

        let output = Trader::new(&make_scenario(BookRequirement::TwoSided))
            .run(&make_state(r#"{"AMETHYSTS":"oops"}"#), &mut TickLogger::default());
        let saved: Value = serde_json::from_str(&output.trader_data).unwrap();
        assert_eq!(saved["AMETHYSTS"], json!([false]));
    }

    #[test]
    fn test_absent_product_still_saves_state() {
        let mut trader = Trader::new(&make_scenario(BookRequirement::TwoSided));
        let state = TradingState::new(0).with_trader_data(r#"{"AMETHYSTS":[true,true]}"#);

        let output = trader.run(&state, &mut TickLogger::default());

        assert!(output.orders.is_empty());
        let saved: Value = serde_json::from_str(&output.trader_data).unwrap();
        assert_eq!(saved["AMETHYSTS"], json!([true, true]));
    }
}
