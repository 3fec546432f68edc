use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Quantity};

/// Resting liquidity for one product at the start of a tick.
///
/// Buy volumes are positive. Sell volumes are stored negative, the way the
/// exchange reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDepth {
    pub buy_orders: BTreeMap<Price, Quantity>,
    pub sell_orders: BTreeMap<Price, Quantity>,
}

impl OrderDepth {
    pub fn new<B, S>(buy_orders: B, sell_orders: S) -> Self
    where
        B: IntoIterator<Item = (Price, Quantity)>,
        S: IntoIterator<Item = (Price, Quantity)>,
    {
        Self {
            buy_orders: buy_orders.into_iter().collect(),
            sell_orders: sell_orders.into_iter().collect(),
        }
    }

    pub fn is_two_sided(&self) -> bool {
        !self.buy_orders.is_empty() && !self.sell_orders.is_empty()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.buy_orders.keys().next_back().copied()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.sell_orders.keys().next().copied()
    }

    pub fn deepest_bid(&self) -> Option<Price> {
        self.buy_orders.keys().next().copied()
    }

    pub fn deepest_ask(&self) -> Option<Price> {
        self.sell_orders.keys().next_back().copied()
    }

    /// Bids from best to worst.
    pub fn bids(&self) -> impl Iterator<Item = (Price, Quantity)> + '_ {
        self.buy_orders.iter().rev().map(|(price, volume)| (*price, *volume))
    }

    /// Asks from best to worst, volumes still negative.
    pub fn asks(&self) -> impl Iterator<Item = (Price, Quantity)> + '_ {
        self.sell_orders.iter().map(|(price, volume)| (*price, *volume))
    }

    /// Bid level holding the most volume; ties go to the higher price.
    pub fn popular_bid(&self) -> Option<Price> {
        self.buy_orders
            .iter()
            .max_by_key(|(_, volume)| **volume)
            .map(|(price, _)| *price)
    }

    /// Ask level holding the most volume; ties go to the lower price.
    pub fn popular_ask(&self) -> Option<Price> {
        self.sell_orders
            .iter()
            .min_by_key(|(_, volume)| **volume)
            .map(|(price, _)| *price)
    }

    /// Midpoint of the most heavily subscribed bid and ask levels.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.popular_bid()?;
        let ask = self.popular_ask()?;
        Some((bid + ask) as f64 / 2.0)
    }
}
