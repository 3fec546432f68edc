use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Value, json};

use crate::{
    strategy::{
        product_context::{ProductContext, WithContext},
        strategy::{OrderSink, SkipReason, Strategy},
        strategy_helpers::StrategyHelpers,
    },
    types::{Quantity, trading_state::TradingState},
};

/// Directional stance. Ordinals are part of the persisted state format.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Signal {
    #[default]
    Neutral,
    Short,
    Long,
}

impl Signal {
    pub fn ordinal(self) -> u64 {
        match self {
            Self::Neutral => 0,
            Self::Short => 1,
            Self::Long => 2,
        }
    }

    pub fn from_ordinal(ordinal: u64) -> Result<Self> {
        match ordinal {
            0 => Ok(Self::Neutral),
            1 => Ok(Self::Short),
            2 => Ok(Self::Long),
            other => Err(anyhow!("unknown signal ordinal {other}")),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// Produces a fresh directional view from the snapshot, or `None` to keep the current one.
pub trait SignalSource {
    fn signal(&mut self, ctx: &ProductContext, state: &TradingState) -> Option<Signal>;

    /// Source-owned state, `None` for stateless sources.
    fn save(&self) -> Option<Value> {
        None
    }

    fn load(&mut self, _state: Value) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SignalMode {
    /// Hold the last signal across ticks and keep working towards it, flattening on neutral.
    #[default]
    Persistent,
    /// Trade only on the tick a signal fires; nothing is held.
    Momentary,
}

/// Which resting level a directional order is priced at.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum OrderPricing {
    /// Best opposite price.
    #[default]
    Touch,
    /// Deepest opposite price, crossing every visible level.
    Sweep,
}

/// Turns a signal into full-size orders against the opposite side of the book.
#[derive(Debug, Clone)]
pub struct SignalStrategy<S: SignalSource> {
    ctx: ProductContext,
    source: S,
    mode: SignalMode,
    pricing: OrderPricing,
    signal: Signal,
}

impl<S: SignalSource> SignalStrategy<S> {
    pub fn new(symbol: &str, limit: Quantity, source: S, mode: SignalMode) -> Self {
        Self {
            ctx: ProductContext::new(symbol, limit),
            source,
            mode,
            pricing: OrderPricing::Touch,
            signal: Signal::Neutral,
        }
    }

    pub fn with_pricing(mut self, pricing: OrderPricing) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    fn decode_signal(state: &Value) -> Result<Signal> {
        let ordinal = state
            .as_u64()
            .ok_or_else(|| anyhow!("signal must be a non-negative integer, got {state}"))?;
        Signal::from_ordinal(ordinal)
    }
}

impl<S: SignalSource> WithContext for SignalStrategy<S> {
    fn ctx(&self) -> &ProductContext {
        &self.ctx
    }
}

impl<S: SignalSource> Strategy for SignalStrategy<S> {
    fn act(&mut self, state: &TradingState, sink: &mut OrderSink) -> Result<(), SkipReason> {
        let fresh = self.source.signal(&self.ctx, state);

        let target = match self.mode {
            SignalMode::Persistent => {
                if let Some(signal) = fresh {
                    self.signal = signal;
                }
                self.signal
            }
            SignalMode::Momentary => match fresh {
                Some(signal) => signal,
                None => return Ok(()),
            },
        };

        let depth = self.own_depth(state)?;
        let (sell_price, buy_price) = match self.pricing {
            OrderPricing::Touch => Self::best_bid_ask(depth)?,
            OrderPricing::Sweep => depth
                .deepest_bid()
                .zip(depth.deepest_ask())
                .ok_or(SkipReason::MissingTopOfBook)?,
        };
        let position = self.position(state);

        match target {
            Signal::Neutral if self.mode == SignalMode::Persistent => {
                if position < 0 {
                    sink.buy(buy_price, -position);
                } else if position > 0 {
                    sink.sell(sell_price, position);
                }
            }
            Signal::Neutral => {}
            Signal::Long => sink.buy(buy_price, self.buy_capacity(position)),
            Signal::Short => sink.sell(sell_price, self.sell_capacity(position)),
        }

        Ok(())
    }

    fn save(&self) -> Value {
        match (self.mode, self.source.save()) {
            (SignalMode::Persistent, None) => Value::from(self.signal.ordinal()),
            (SignalMode::Persistent, Some(source)) => {
                json!({ "signal": self.signal.ordinal(), "source": source })
            }
            (SignalMode::Momentary, source) => source.unwrap_or(Value::Null),
        }
    }

    fn load(&mut self, state: Value) -> Result<()> {
        match (self.mode, state) {
            (SignalMode::Momentary, source) => self.source.load(source),
            (SignalMode::Persistent, Value::Object(mut fields)) => {
                let signal = fields
                    .remove("signal")
                    .ok_or_else(|| anyhow!("signal state is missing its \"signal\" field"))?;
                let signal = Self::decode_signal(&signal)?;
                if let Some(source) = fields.remove("source") {
                    self.source
                        .load(source)
                        .context("failed to restore signal source")?;
                }
                /* NOTE: assigned last so a failed source restore leaves the signal untouched */
                self.signal = signal;
                Ok(())
            }
            (SignalMode::Persistent, state @ Value::Number(_)) => {
                self.signal = Self::decode_signal(&state)?;
                Ok(())
            }
            (SignalMode::Persistent, other) => bail!("unexpected signal state {other}"),
        }
    }
}
