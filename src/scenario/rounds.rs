use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;

/// Strategy tables selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    #[clap(name = "round4")]
    Round4,
    #[clap(name = "round5")]
    Round5,
    #[clap(name = "round5-coconut-reversal")]
    Round5CoconutReversal,
    #[clap(name = "round5-premium-bands")]
    Round5PremiumBands,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round4 => write!(f, "round4"),
            Self::Round5 => write!(f, "round5"),
            Self::Round5CoconutReversal => write!(f, "round5-coconut-reversal"),
            Self::Round5PremiumBands => write!(f, "round5-premium-bands"),
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "round4" | "r4" => Ok(Self::Round4),
            "round5" | "r5" => Ok(Self::Round5),
            "round5-coconut-reversal" => Ok(Self::Round5CoconutReversal),
            "round5-premium-bands" => Ok(Self::Round5PremiumBands),
            other => Err(anyhow!("unknown scenario kind: {other}")),
        }
    }
}
