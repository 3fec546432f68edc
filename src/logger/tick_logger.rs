use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::types::{
    Symbol, observation::Observation, order::Order, trade::Trade, trading_state::TradingState,
};

/// Buffers free-form log lines for one tick and renders the compressed line
/// the visualizer expects.
#[derive(Debug, Clone)]
pub struct TickLogger {
    logs: String,
    max_log_length: usize,
}

impl Default for TickLogger {
    fn default() -> Self {
        Self::new(Self::MAX_LOG_LENGTH)
    }
}

impl TickLogger {
    pub const MAX_LOG_LENGTH: usize = 3750;

    pub fn new(max_log_length: usize) -> Self {
        Self {
            logs: String::new(),
            max_log_length,
        }
    }

    pub fn print(&mut self, line: impl AsRef<str>) {
        self.logs.push_str(line.as_ref());
        self.logs.push('\n');
    }

    pub fn logs(&self) -> &str {
        &self.logs
    }

    /// Renders the tick and clears the buffer.
    pub fn flush(
        &mut self,
        state: &TradingState,
        orders: &BTreeMap<Symbol, Vec<Order>>,
        conversions: i64,
        trader_data: &str,
    ) -> String {
        let compressed_orders = compress_orders(orders);
        let base_length = json!([
            compress_state(state, ""),
            compressed_orders,
            conversions,
            "",
            "",
        ])
        .to_string()
        .chars()
        .count();

        // The echoed state, the outgoing state and the logs share what is left evenly.
        let max_item_length = self.max_log_length.saturating_sub(base_length) / 3;

        let line = json!([
            compress_state(state, &truncate(&state.trader_data, max_item_length)),
            compressed_orders,
            conversions,
            truncate(trader_data, max_item_length),
            truncate(&self.logs, max_item_length),
        ])
        .to_string();

        self.logs.clear();
        line
    }
}

fn compress_state(state: &TradingState, trader_data: &str) -> Value {
    json!([
        state.timestamp,
        trader_data,
        compress_listings(state),
        compress_order_depths(state),
        compress_trades(&state.own_trades),
        compress_trades(&state.market_trades),
        state.position,
        compress_observations(&state.observations),
    ])
}

fn compress_listings(state: &TradingState) -> Value {
    state
        .listings
        .values()
        .map(|listing| json!([listing.symbol, listing.product, listing.denomination]))
        .collect()
}

fn compress_order_depths(state: &TradingState) -> Value {
    let depths: serde_json::Map<String, Value> = state
        .order_depths
        .iter()
        .map(|(symbol, depth)| {
            (
                symbol.clone(),
                json!([depth.buy_orders, depth.sell_orders]),
            )
        })
        .collect();
    Value::Object(depths)
}

fn compress_trades(trades: &BTreeMap<Symbol, Vec<Trade>>) -> Value {
    trades
        .values()
        .flatten()
        .map(|trade| {
            json!([
                trade.symbol,
                trade.price,
                trade.quantity,
                trade.buyer,
                trade.seller,
                trade.timestamp,
            ])
        })
        .collect()
}

fn compress_observations(observations: &Observation) -> Value {
    let conversions: serde_json::Map<String, Value> = observations
        .conversion_observations
        .iter()
        .map(|(product, observation)| {
            (
                product.clone(),
                json!([
                    observation.bid_price,
                    observation.ask_price,
                    observation.transport_fees,
                    observation.export_tariff,
                    observation.import_tariff,
                    observation.sunlight,
                    observation.humidity,
                ]),
            )
        })
        .collect();
    json!([observations.plain_value_observations, conversions])
}

fn compress_orders(orders: &BTreeMap<Symbol, Vec<Order>>) -> Value {
    orders
        .values()
        .flatten()
        .map(|order| json!([order.symbol, order.price, order.quantity]))
        .collect()
}

/// Cuts `value` to `max_length` characters, marking the cut with `...`.
pub fn truncate(value: &str, max_length: usize) -> String {
    if value.chars().count() <= max_length {
        return value.to_string();
    }

    let mut truncated: String = value.chars().take(max_length.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
