//! Strategy catalog: the signal producers a run can select.
//!
//! Ids are stable and match the order strategies are listed to users.

use backlab_core::signals::{BollingerBreakout, MaCrossover, RsiReversal, SignalProducer};
use serde::{Deserialize, Serialize};

/// A selectable strategy with its parameters.
///
/// Deserializes from a table tagged by `name`; omitted parameters take the
/// producer defaults, e.g. `{ name = "ma_crossover", short_window = 20 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum StrategyConfig {
    MaCrossover(MaCrossover),
    RsiReversal(RsiReversal),
    BollingerBreakout(BollingerBreakout),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::MaCrossover(MaCrossover::default())
    }
}

impl StrategyConfig {
    /// Default-parameter strategy for a catalog id.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::MaCrossover(MaCrossover::default())),
            2 => Some(Self::RsiReversal(RsiReversal::default())),
            3 => Some(Self::BollingerBreakout(BollingerBreakout::default())),
            _ => None,
        }
    }

    /// Look up by catalog id or snake_case key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.parse::<u32>() {
            Ok(id) => Self::from_id(id),
            Err(_) => catalog()
                .into_iter()
                .find(|s| s.key == key)
                .and_then(|s| Self::from_id(s.id)),
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::MaCrossover(_) => 1,
            Self::RsiReversal(_) => 2,
            Self::BollingerBreakout(_) => 3,
        }
    }

    /// Reject parameters the producers cannot run with.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::MaCrossover(p) if p.short_window == 0 || p.long_window == 0 => {
                Err("ma_crossover windows must be >= 1".into())
            }
            Self::RsiReversal(p) if p.period == 0 => Err("rsi_reversal period must be >= 1".into()),
            Self::BollingerBreakout(p) if p.window < 2 => {
                Err("bollinger_breakout window must be >= 2".into())
            }
            _ => Ok(()),
        }
    }

    /// Build the producer. Called once per run.
    pub fn producer(&self) -> Box<dyn SignalProducer> {
        match self {
            Self::MaCrossover(p) => Box::new(p.clone()),
            Self::RsiReversal(p) => Box::new(p.clone()),
            Self::BollingerBreakout(p) => Box::new(p.clone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MaCrossover(_) => "ma_crossover",
            Self::RsiReversal(_) => "rsi_reversal",
            Self::BollingerBreakout(_) => "bollinger_breakout",
        }
    }
}

/// Catalog entry shown to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyInfo {
    pub id: u32,
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<(&'static str, f64)>,
}

pub fn catalog() -> Vec<StrategyInfo> {
    let ma = MaCrossover::default();
    let rsi = RsiReversal::default();
    let bb = BollingerBreakout::default();
    vec![
        StrategyInfo {
            id: 1,
            key: "ma_crossover",
            name: "Moving Average Crossover",
            description: "Buy on a golden cross of the short and long moving averages, sell on a death cross",
            params: vec![
                ("short_window", ma.short_window as f64),
                ("long_window", ma.long_window as f64),
            ],
        },
        StrategyInfo {
            id: 2,
            key: "rsi_reversal",
            name: "RSI Oversold Reversal",
            description: "Buy when RSI turns up from below the oversold level, sell when it turns down from above overbought",
            params: vec![
                ("period", rsi.period as f64),
                ("overbought", rsi.overbought),
                ("oversold", rsi.oversold),
            ],
        },
        StrategyInfo {
            id: 3,
            key: "bollinger_breakout",
            name: "Bollinger Band Breakout",
            description: "Buy when price recovers above the lower band, sell when it falls back below the upper band",
            params: vec![("window", bb.window as f64), ("num_std", bb.num_std)],
        },
    ]
}
