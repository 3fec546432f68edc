use crate::{
    strategy::{
        product_context::ProductContext,
        signal_strategy::{Signal, SignalSource},
    },
    types::{trade::Trade, trading_state::TradingState},
};

/// The same trader shows up under both spellings on the tape.
pub const RHIANNA: &[&str] = &["Rhianna", "Rihanna"];

/// A buyer/seller pairing, each side an alias list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePattern {
    pub buyers: Vec<String>,
    pub sellers: Vec<String>,
}

impl TradePattern {
    pub fn new(buyers: &[&str], sellers: &[&str]) -> Self {
        Self {
            buyers: buyers.iter().map(|name| name.to_string()).collect(),
            sellers: sellers.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn exact(buyer: &str, seller: &str) -> Self {
        Self::new(&[buyer], &[seller])
    }

    /// Same counterparties with the roles swapped.
    pub fn reversed(&self) -> Self {
        Self {
            buyers: self.sellers.clone(),
            sellers: self.buyers.clone(),
        }
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        self.buyers.iter().any(|name| *name == trade.buyer)
            && self.sellers.iter().any(|name| *name == trade.seller)
    }
}

/// Follows informed counterparties: a print matching `long` on the previous
/// tick goes long, one matching `short` goes short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartySignal {
    pub long: TradePattern,
    pub short: TradePattern,
}

impl CounterpartySignal {
    pub fn new(long: TradePattern, short: TradePattern) -> Self {
        Self { long, short }
    }

    /// Long when `pattern` trades, short when the same pair trades the other way.
    pub fn mirrored(pattern: TradePattern) -> Self {
        let short = pattern.reversed();
        Self::new(pattern, short)
    }
}

impl SignalSource for CounterpartySignal {
    fn signal(&mut self, ctx: &ProductContext, state: &TradingState) -> Option<Signal> {
        let trades: Vec<&Trade> = state.previous_tick_trades(ctx.symbol()).collect();

        if trades.iter().any(|trade| self.long.matches(trade)) {
            return Some(Signal::Long);
        }
        if trades.iter().any(|trade| self.short.matches(trade)) {
            return Some(Signal::Short);
        }
        None
    }
}
