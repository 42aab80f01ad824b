use crate::enums::{CloseReason, PositionSide, StrategyKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Neutral reading for a symbol the engine has not seen before.
pub const MOMENTUM_NEUTRAL: Decimal = dec!(50);
/// Floor and ceiling of the momentum index. Keeps the oscillator off 0/100.
pub const MOMENTUM_FLOOR: Decimal = dec!(10);
pub const MOMENTUM_CEILING: Decimal = dec!(90);

/// A single reading from a price feed, before the engine attaches its momentum index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerUpdate {
    pub symbol: String,
    pub price: Decimal,
    /// Signed percent, e.g. `-2.5` for -2.5%.
    pub change_24h: Decimal,
    pub volume_24h: Decimal,
}

/// The latest known market state of one trading pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPair {
    pub symbol: String,
    pub price: Decimal,
    pub change_24h: Decimal,
    pub volume_24h: Decimal,
    /// RSI-like smoothed indicator, always within `[10, 90]`.
    pub momentum_index: Decimal,
}

impl MarketPair {
    /// Builds a pair from a fresh ticker with a neutral momentum reading.
    pub fn from_ticker(ticker: TickerUpdate) -> Self {
        Self {
            symbol: ticker.symbol,
            price: ticker.price,
            change_24h: ticker.change_24h,
            volume_24h: ticker.volume_24h,
            momentum_index: MOMENTUM_NEUTRAL,
        }
    }
}

/// Clamps a momentum reading into the `[10, 90]` band.
pub fn clamp_momentum(value: Decimal) -> Decimal {
    value.max(MOMENTUM_FLOOR).min(MOMENTUM_CEILING)
}

/// An open simulated position.
///
/// `amount` is the margin committed in quote currency (USDT). `pnl_percent` is
/// a whole percent, so `5` means 5% return on margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub amount: Decimal,
    pub leverage: u32,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Opens a flat position at `price`. The caller guarantees `price > 0`.
    pub fn open(
        symbol: impl Into<String>,
        side: PositionSide,
        price: Decimal,
        amount: Decimal,
        leverage: u32,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            side,
            entry_price: price,
            current_price: price,
            amount,
            leverage,
            pnl: Decimal::ZERO,
            pnl_percent: Decimal::ZERO,
            opened_at,
        }
    }

    /// Leveraged return on margin at `price`, in whole percent.
    /// `None` when the result does not fit in a `Decimal`.
    pub fn pnl_percent_at(&self, price: Decimal) -> Option<Decimal> {
        if self.entry_price.is_zero() {
            return Some(Decimal::ZERO);
        }
        price
            .checked_sub(self.entry_price)?
            .checked_div(self.entry_price)?
            .checked_mul(self.side.direction())?
            .checked_mul(Decimal::from(self.leverage))?
            .checked_mul(dec!(100))
    }

    /// Marks the position to `price` and recomputes `pnl` / `pnl_percent`.
    ///
    /// Returns `false`, leaving the position untouched, when the move is too
    /// large to represent.
    pub fn revalue(&mut self, price: Decimal) -> bool {
        let Some(pnl_percent) = self.pnl_percent_at(price) else {
            return false;
        };
        let Some(pnl) = self
            .amount
            .checked_mul(pnl_percent)
            .and_then(|v| v.checked_div(dec!(100)))
        else {
            return false;
        };
        self.current_price = price;
        self.pnl_percent = pnl_percent;
        self.pnl = pnl;
        true
    }

    /// Margin plus realized P&L, i.e. what closing returns to the balance.
    pub fn settlement_value(&self) -> Decimal {
        self.amount + self.pnl
    }

    /// Converts the position into its immutable ledger record at the current price.
    pub fn close(self, reason: CloseReason, closed_at: DateTime<Utc>) -> TradeHistory {
        TradeHistory {
            id: self.id,
            symbol: self.symbol,
            side: self.side,
            entry_price: self.entry_price,
            exit_price: self.current_price,
            pnl: self.pnl,
            close_reason: reason,
            closed_at,
        }
    }
}

/// A closed trade. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistory {
    pub id: Uuid,
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub pnl: Decimal,
    pub close_reason: CloseReason,
    pub closed_at: DateTime<Utc>,
}

/// A directional trade recommendation for one pair, produced by a signal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub side: PositionSide,
    /// The pattern variant the scanner was configured with when it fired.
    pub pattern: StrategyKind,
}

impl Signal {
    /// The scanner line shown in the activity feed for this detection.
    pub fn describe(&self) -> String {
        let direction = if self.side.is_bullish() { "Bullish" } else { "Bearish" };
        let (found, ratio) = match self.pattern {
            StrategyKind::HarmonicGartley => ("pattern confirmed on", "B retracement = 0.618"),
            StrategyKind::HarmonicButterfly => ("detected on", "D extension = 1.27"),
            StrategyKind::HarmonicBat => ("pattern on", "Reversal at 0.886"),
        };
        format!(
            "Pattern scanner: {} {} {} {}. {}.",
            self.pattern.pattern_name(),
            direction,
            found,
            self.symbol,
            ratio
        )
    }
}
