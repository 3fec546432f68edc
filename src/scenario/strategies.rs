use std::fmt;

use crate::{
    strategy::{
        Strategy,
        market_making::MarketMakingStrategy,
        signal_strategy::{OrderPricing, SignalMode, SignalStrategy},
        strategies::{
            basket_spread::{BasketRule, BasketSpreadSignal},
            conversion_arbitrage::ConversionArbitrageStrategy,
            counterparty::{CounterpartySignal, TradePattern},
            option_mispricing::{OptionMispricingSignal, OptionParams},
            price_threshold::PriceThresholdSignal,
            repeat_counterparty::RepeatCounterpartySignal,
        },
    },
    types::{Price, Quantity},
};

/// Where a signal strategy's view comes from, with its configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    Counterparty(CounterpartySignal),
    BasketSpread(BasketRule),
    RepeatCounterparty(TradePattern),
    OptionMispricing(OptionParams),
    PriceThreshold,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counterparty(_) => write!(f, "counterparty"),
            Self::BasketSpread(_) => write!(f, "basket-spread"),
            Self::RepeatCounterparty(_) => write!(f, "repeat-counterparty"),
            Self::OptionMispricing(_) => write!(f, "option-mispricing"),
            Self::PriceThreshold => write!(f, "price-threshold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    FixedMarketMaker {
        true_value: Price,
    },
    MidPriceMarketMaker,
    ConversionArbitrage,
    Signal {
        source: SignalKind,
        mode: SignalMode,
        pricing: OrderPricing,
    },
}

impl StrategyKind {
    pub fn signal(source: SignalKind, mode: SignalMode) -> Self {
        Self::Signal {
            source,
            mode,
            pricing: OrderPricing::Touch,
        }
    }

    pub fn build(&self, symbol: &str, limit: Quantity) -> Box<dyn Strategy> {
        match self {
            Self::FixedMarketMaker { true_value } => {
                Box::new(MarketMakingStrategy::fixed(symbol, limit, *true_value))
            }
            Self::MidPriceMarketMaker => Box::new(MarketMakingStrategy::mid_price(symbol, limit)),
            Self::ConversionArbitrage => Box::new(ConversionArbitrageStrategy::new(symbol, limit)),
            Self::Signal {
                source,
                mode,
                pricing,
            } => match source {
                SignalKind::Counterparty(signal) => Box::new(
                    SignalStrategy::new(symbol, limit, signal.clone(), *mode)
                        .with_pricing(*pricing),
                ),
                SignalKind::BasketSpread(rule) => Box::new(
                    SignalStrategy::new(symbol, limit, BasketSpreadSignal::new(*rule), *mode)
                        .with_pricing(*pricing),
                ),
                SignalKind::RepeatCounterparty(pair) => Box::new(
                    SignalStrategy::new(
                        symbol,
                        limit,
                        RepeatCounterpartySignal::new(pair.clone()),
                        *mode,
                    )
                    .with_pricing(*pricing),
                ),
                SignalKind::OptionMispricing(params) => Box::new(
                    SignalStrategy::new(
                        symbol,
                        limit,
                        OptionMispricingSignal::new(params.clone()),
                        *mode,
                    )
                    .with_pricing(*pricing),
                ),
                SignalKind::PriceThreshold => Box::new(
                    SignalStrategy::new(symbol, limit, PriceThresholdSignal::default(), *mode)
                        .with_pricing(*pricing),
                ),
            },
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedMarketMaker { true_value } => write!(f, "fixed-mm({true_value})"),
            Self::MidPriceMarketMaker => write!(f, "mid-mm"),
            Self::ConversionArbitrage => write!(f, "conversion-arbitrage"),
            Self::Signal { source, .. } => write!(f, "{source}"),
        }
    }
}
