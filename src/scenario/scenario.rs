use tracing::info;

use crate::{
    scenario::{
        rounds::ScenarioKind,
        strategies::{SignalKind, StrategyKind},
    },
    strategy::{
        Strategy,
        signal_strategy::{OrderPricing, SignalMode},
        strategies::{
            basket_spread::{BasketRule, GIFT_BASKET},
            counterparty::{CounterpartySignal, RHIANNA, TradePattern},
            option_mispricing::OptionParams,
        },
    },
    trader::BookRequirement,
    types::{Quantity, Symbol},
};

/// Exchange position limits per product.
pub const POSITION_LIMITS: &[(&str, Quantity)] = &[
    ("AMETHYSTS", 20),
    ("STARFRUIT", 20),
    ("ORCHIDS", 100),
    ("CHOCOLATE", 250),
    ("STRAWBERRIES", 350),
    ("ROSES", 60),
    ("GIFT_BASKET", 60),
    ("COCONUT", 300),
    ("COCONUT_COUPON", 600),
];

pub const BASKET_PRODUCTS: &[&str] = &["CHOCOLATE", "STRAWBERRIES", "ROSES", GIFT_BASKET];

pub fn position_limit(symbol: &str) -> Option<Quantity> {
    POSITION_LIMITS
        .iter()
        .find(|(product, _)| *product == symbol)
        .map(|(_, limit)| *limit)
}

/// Premium thresholds tuned per traded product.
pub fn absolute_basket_rule(symbol: &str) -> BasketRule {
    let (long, short) = match symbol {
        "CHOCOLATE" => (230.0, 355.0),
        "STRAWBERRIES" => (195.0, 485.0),
        "ROSES" => (325.0, 370.0),
        _ => (290.0, 355.0),
    };
    BasketRule::Absolute { long, short }
}

pub fn premium_band_rule(symbol: &str) -> BasketRule {
    let (premium, band) = match symbol {
        "CHOCOLATE" => (285.0, 0.19),
        "STRAWBERRIES" => (340.0, 0.43),
        "ROSES" => (350.0, 0.05),
        _ => (325.0, 0.12),
    };
    BasketRule::PremiumBand { premium, band }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEntry {
    pub symbol: Symbol,
    pub limit: Quantity,
    pub kind: StrategyKind,
}

impl ScenarioEntry {
    pub fn new(symbol: &str, limit: Quantity, kind: StrategyKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            limit,
            kind,
        }
    }

    /// Entry using the exchange limit of `symbol`.
    pub fn for_product(symbol: &str, kind: StrategyKind) -> Self {
        Self::new(symbol, position_limit(symbol).unwrap_or_default(), kind)
    }
}

/// Ordered product table a `Trader` is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub entries: Vec<ScenarioEntry>,
    pub book_requirement: BookRequirement,
}

impl Scenario {
    pub fn new(name: &str, entries: Vec<ScenarioEntry>, book_requirement: BookRequirement) -> Self {
        Self {
            name: name.to_string(),
            entries,
            book_requirement,
        }
    }

    pub fn from_kind(kind: ScenarioKind) -> Self {
        info!(scenario = %kind, "creating scenario");

        match kind {
            ScenarioKind::Round4 => Self::round4(),
            ScenarioKind::Round5 => Self::round5(),
            ScenarioKind::Round5CoconutReversal => Self::round5_with_coconut_reversal(),
            ScenarioKind::Round5PremiumBands => Self::round5_with_premium_bands(),
        }
    }

    /// Market makers and conversion arbitrage shared by both submissions.
    fn base_entries() -> Vec<ScenarioEntry> {
        vec![
            ScenarioEntry::for_product(
                "AMETHYSTS",
                StrategyKind::FixedMarketMaker { true_value: 10_000 },
            ),
            ScenarioEntry::for_product("STARFRUIT", StrategyKind::MidPriceMarketMaker),
            ScenarioEntry::for_product("ORCHIDS", StrategyKind::ConversionArbitrage),
        ]
    }

    pub fn round4() -> Self {
        let momentary = |source| StrategyKind::signal(source, SignalMode::Momentary);

        let mut entries = Self::base_entries();
        entries.extend([
            ScenarioEntry::for_product(
                GIFT_BASKET,
                momentary(SignalKind::BasketSpread(absolute_basket_rule(GIFT_BASKET))),
            ),
            ScenarioEntry::for_product("COCONUT", momentary(SignalKind::PriceThreshold)),
            ScenarioEntry::for_product(
                "COCONUT_COUPON",
                momentary(SignalKind::OptionMispricing(OptionParams::round4())),
            ),
        ]);

        Self::new("round4", entries, BookRequirement::Present)
    }

    pub fn round5() -> Self {
        Self::round5_with(absolute_basket_rule, false, "round5")
    }

    /// Round 5 with the repeat-counterparty COCONUT strategy switched on.
    pub fn round5_with_coconut_reversal() -> Self {
        Self::round5_with(absolute_basket_rule, true, "round5-coconut-reversal")
    }

    /// Round 5 trading the basket spread on premium bands instead of fixed thresholds.
    pub fn round5_with_premium_bands() -> Self {
        Self::round5_with(premium_band_rule, false, "round5-premium-bands")
    }

    fn round5_with(
        basket_rule: fn(&str) -> BasketRule,
        coconut_reversal: bool,
        name: &str,
    ) -> Self {
        let persistent = |source| StrategyKind::signal(source, SignalMode::Persistent);
        let basket = |symbol: &str| {
            let rule = basket_rule(symbol);
            ScenarioEntry::for_product(symbol, persistent(SignalKind::BasketSpread(rule)))
        };

        let mut entries = Self::base_entries();
        entries.extend([
            ScenarioEntry::for_product(
                "CHOCOLATE",
                persistent(SignalKind::Counterparty(CounterpartySignal::mirrored(
                    TradePattern::exact("Vladimir", "Remy"),
                ))),
            ),
            basket("STRAWBERRIES"),
            ScenarioEntry::for_product(
                "ROSES",
                persistent(SignalKind::Counterparty(CounterpartySignal::mirrored(
                    TradePattern::new(RHIANNA, &["Vinnie"]),
                ))),
            ),
            basket(GIFT_BASKET),
        ]);

        if coconut_reversal {
            entries.push(ScenarioEntry::for_product(
                "COCONUT",
                persistent(SignalKind::RepeatCounterparty(TradePattern::new(&["Vinnie"], RHIANNA))),
            ));
        }

        entries.push(ScenarioEntry::for_product(
            "COCONUT_COUPON",
            persistent(SignalKind::OptionMispricing(OptionParams::round5())),
        ));

        Self::new(name, entries, BookRequirement::TwoSided)
    }

    /// Every basket product trading the same absolute thresholds, sweeping the book on each signal.
    pub fn basket_thresholds(long: f64, short: f64) -> Self {
        let entries = BASKET_PRODUCTS
            .iter()
            .map(|symbol| {
                ScenarioEntry::for_product(
                    symbol,
                    StrategyKind::Signal {
                        source: SignalKind::BasketSpread(BasketRule::Absolute { long, short }),
                        mode: SignalMode::Momentary,
                        pricing: OrderPricing::Sweep,
                    },
                )
            })
            .collect();

        Self::new("basket-thresholds", entries, BookRequirement::Present)
    }

    /// Every product following the same pair of counterparty patterns.
    pub fn counterparty_pairs(long: TradePattern, short: TradePattern) -> Self {
        let entries = POSITION_LIMITS
            .iter()
            .map(|(symbol, limit)| {
                ScenarioEntry::new(
                    symbol,
                    *limit,
                    StrategyKind::signal(
                        SignalKind::Counterparty(CounterpartySignal::new(
                            long.clone(),
                            short.clone(),
                        )),
                        SignalMode::Persistent,
                    ),
                )
            })
            .collect();

        Self::new("counterparty-pairs", entries, BookRequirement::TwoSided)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.symbol.as_str())
    }

    pub fn limit(&self, symbol: &str) -> Option<Quantity> {
        self.entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| entry.limit)
    }

    pub fn build_strategies(&self) -> Vec<(Symbol, Box<dyn Strategy>)> {
        self.entries
            .iter()
            .map(|entry| {
                tracing::debug!(
                    symbol = %entry.symbol,
                    strategy = %entry.kind,
                    "creating strategy"
                );
                (entry.symbol.clone(), entry.kind.build(&entry.symbol, entry.limit))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(scenario: &Scenario) -> Vec<&str> {
        scenario.symbols().collect()
    }

    #[test]
    fn test_round5_table() {
        let scenario = Scenario::round5();
        assert_eq!(
            symbols(&scenario),
            vec![
                "AMETHYSTS",
                "STARFRUIT",
                "ORCHIDS",
                "CHOCOLATE",
                "STRAWBERRIES",
                "ROSES",
                "GIFT_BASKET",
                "COCONUT_COUPON"
            ]
        );
        assert_eq!(scenario.book_requirement, BookRequirement::TwoSided);
        assert_eq!(scenario.limit("COCONUT_COUPON"), Some(600));
    }

    #[test]
    fn test_coconut_reversal_adds_coconut() {
        let scenario = Scenario::round5_with_coconut_reversal();
        assert_eq!(scenario.limit("COCONUT"), Some(300));
        assert_eq!(scenario.entries.len(), Scenario::round5().entries.len() + 1);
    }

    #[test]
    fn test_round4_table() {
        let scenario = Scenario::round4();
        assert_eq!(
            symbols(&scenario),
            vec!["AMETHYSTS", "STARFRUIT", "ORCHIDS", "GIFT_BASKET", "COCONUT", "COCONUT_COUPON"]
        );
        assert_eq!(scenario.book_requirement, BookRequirement::Present);
    }

    #[test]
    fn test_every_entry_has_a_limit() {
        for scenario in [
            Scenario::round4(),
            Scenario::round5(),
            Scenario::round5_with_coconut_reversal(),
            Scenario::round5_with_premium_bands(),
            Scenario::basket_thresholds(200.0, 300.0),
        ] {
            for entry in &scenario.entries {
                assert!(entry.limit > 0, "{} has no limit in {}", entry.symbol, scenario.name);
            }
            assert_eq!(scenario.build_strategies().len(), scenario.entries.len());
        }
    }

    #[test]
    fn test_basket_rules_per_product() {
        assert_eq!(
            absolute_basket_rule("STRAWBERRIES"),
            BasketRule::Absolute { long: 195.0, short: 485.0 }
        );
        assert_eq!(
            premium_band_rule("ROSES"),
            BasketRule::PremiumBand { premium: 350.0, band: 0.05 }
        );
    }
}
