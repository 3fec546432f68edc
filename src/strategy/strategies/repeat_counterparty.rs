use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    strategy::{
        product_context::ProductContext,
        signal_strategy::{Signal, SignalSource},
        strategies::counterparty::TradePattern,
    },
    types::{Price, trading_state::TradingState},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct LastPrint {
    last_buyer: Option<String>,
    last_price: Option<Price>,
}

/// Watches one pair of counterparties trading with each other. When the same
/// side buys twice in a row, the direction of the price change is the signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatCounterpartySignal {
    pair: TradePattern,
    last: LastPrint,
}

impl RepeatCounterpartySignal {
    pub fn new(pair: TradePattern) -> Self {
        Self {
            pair,
            last: LastPrint::default(),
        }
    }

    pub fn last_price(&self) -> Option<Price> {
        self.last.last_price
    }
}

impl SignalSource for RepeatCounterpartySignal {
    fn signal(&mut self, ctx: &ProductContext, state: &TradingState) -> Option<Signal> {
        let reversed = self.pair.reversed();
        let trade = state
            .previous_tick_trades(ctx.symbol())
            .find(|trade| self.pair.matches(trade) || reversed.matches(trade))?;

        let signal = match self.last.last_price {
            Some(last_price) if self.last.last_buyer.as_deref() == Some(trade.buyer.as_str()) => {
                if last_price > trade.price {
                    Some(Signal::Short)
                } else if last_price < trade.price {
                    Some(Signal::Long)
                } else {
                    None
                }
            }
            _ => None,
        };

        self.last = LastPrint {
            last_buyer: Some(trade.buyer.clone()),
            last_price: Some(trade.price),
        };

        signal
    }

    fn save(&self) -> Option<Value> {
        serde_json::to_value(&self.last).ok()
    }

    fn load(&mut self, state: Value) -> Result<()> {
        self.last = serde_json::from_value(state).context("malformed last counterparty print")?;
        Ok(())
    }
}
