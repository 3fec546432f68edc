use crate::{
    strategy::{product_context::WithContext, strategy::SkipReason},
    types::{Price, Quantity, order_depth::OrderDepth, trading_state::TradingState},
};

pub trait StrategyHelpers: WithContext {
    fn position(&self, state: &TradingState) -> Quantity {
        state.position(self.ctx().symbol())
    }

    /// Room left before the long limit.
    fn buy_capacity(&self, position: Quantity) -> Quantity {
        self.ctx().limit() - position
    }

    /// Room left before the short limit.
    fn sell_capacity(&self, position: Quantity) -> Quantity {
        self.ctx().limit() + position
    }

    fn own_depth<'a>(&self, state: &'a TradingState) -> Result<&'a OrderDepth, SkipReason> {
        two_sided_depth(state, self.ctx().symbol())
    }

    fn best_bid_ask(depth: &OrderDepth) -> Result<(Price, Price), SkipReason> {
        match (depth.best_bid(), depth.best_ask()) {
            (Some(bid), Some(ask)) => Ok((bid, ask)),
            _ => Err(SkipReason::MissingTopOfBook),
        }
    }
}

impl<T: WithContext> StrategyHelpers for T {}

/// Book for `symbol`, provided it has resting orders on both sides.
pub fn two_sided_depth<'a>(
    state: &'a TradingState,
    symbol: &str,
) -> Result<&'a OrderDepth, SkipReason> {
    let depth = state
        .order_depth(symbol)
        .ok_or_else(|| SkipReason::MissingBook(symbol.to_string()))?;
    if !depth.is_two_sided() {
        return Err(SkipReason::OneSidedBook(symbol.to_string()));
    }
    Ok(depth)
}

/// Popular mid of `symbol`, skipping when the book is absent or one-sided.
pub fn mid_price(state: &TradingState, symbol: &str) -> Result<f64, SkipReason> {
    two_sided_depth(state, symbol)?
        .mid_price()
        .ok_or_else(|| SkipReason::OneSidedBook(symbol.to_string()))
}
