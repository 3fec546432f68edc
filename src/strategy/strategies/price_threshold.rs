use anyhow::{Result, bail};
use serde_json::Value;

use crate::{
    strategy::{
        product_context::ProductContext,
        signal_strategy::{Signal, SignalSource},
        strategy_helpers::mid_price,
    },
    types::trading_state::TradingState,
};

/// Anchors on the first mid it sees: above it is long, below it is short.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceThresholdSignal {
    threshold: Option<f64>,
}

impl PriceThresholdSignal {
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }
}

impl SignalSource for PriceThresholdSignal {
    fn signal(&mut self, ctx: &ProductContext, state: &TradingState) -> Option<Signal> {
        let mid = mid_price(state, ctx.symbol()).ok()?;
        let threshold = *self.threshold.get_or_insert(mid);

        if mid > threshold {
            Some(Signal::Long)
        } else if mid < threshold {
            Some(Signal::Short)
        } else {
            None
        }
    }

    fn save(&self) -> Option<Value> {
        Some(self.threshold.map(Value::from).unwrap_or(Value::Null))
    }

    fn load(&mut self, state: Value) -> Result<()> {
        self.threshold = match state {
            Value::Null => None,
            Value::Number(number) => number.as_f64(),
            other => bail!("price threshold must be a number or null, got {other}"),
        };
        Ok(())
    }
}
