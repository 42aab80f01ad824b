use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// `1` for longs, `-1` for shorts. Multiplies the raw price move.
    pub fn direction(&self) -> Decimal {
        match self {
            PositionSide::Long => Decimal::ONE,
            PositionSide::Short => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, PositionSide::Long)
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// The harmonic pattern variant the signal scanner reports.
///
/// The variant only changes the wording of the detection message; detection
/// odds and direction are identical for all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    #[default]
    HarmonicGartley,
    HarmonicButterfly,
    HarmonicBat,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::HarmonicGartley,
        StrategyKind::HarmonicButterfly,
        StrategyKind::HarmonicBat,
    ];

    /// Short human-readable pattern name.
    pub fn pattern_name(&self) -> &'static str {
        match self {
            StrategyKind::HarmonicGartley => "Gartley",
            StrategyKind::HarmonicButterfly => "Butterfly",
            StrategyKind::HarmonicBat => "Bat",
        }
    }

    /// One-line description of the pattern geometry the variant is named after.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::HarmonicGartley => {
                "Classic 'M' or 'W' shape: 61.8% retracement on leg B, reversal at D = 78.6% of XA. Suited to ranging markets."
            }
            StrategyKind::HarmonicButterfly => {
                "Trend-extension pattern: reversal at new highs/lows with D extended to 127% or 161.8% of XA."
            }
            StrategyKind::HarmonicBat => {
                "Deep retracement: B touches 38.2% or 50% of XA, entry at the 88.6% retracement."
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::HarmonicGartley => "HARMONIC_GARTLEY",
            StrategyKind::HarmonicButterfly => "HARMONIC_BUTTERFLY",
            StrategyKind::HarmonicBat => "HARMONIC_BAT",
        };
        f.write_str(name)
    }
}

impl FromStr for StrategyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "harmonic_gartley" | "gartley" => Ok(StrategyKind::HarmonicGartley),
            "harmonic_butterfly" | "butterfly" => Ok(StrategyKind::HarmonicButterfly),
            "harmonic_bat" | "bat" => Ok(StrategyKind::HarmonicBat),
            other => Err(CoreError::InvalidInput(
                "strategy".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Why a position left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    Emergency,
}

impl CloseReason {
    pub fn label(&self) -> &'static str {
        match self {
            CloseReason::StopLoss => "Stop loss (point X invalidated)",
            CloseReason::TakeProfit => "Harmonic target reached",
            CloseReason::Emergency => "Emergency stop",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloseReason::StopLoss => "stop-loss",
            CloseReason::TakeProfit => "take-profit",
            CloseReason::Emergency => "emergency",
        };
        f.write_str(name)
    }
}
