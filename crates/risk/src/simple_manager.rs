use crate::error::RiskError;
use crate::{AccountView, EntryOrder, RiskManager};
use configuration::BotConfig;
use core_types::{CloseReason, MarketPair, Position, PositionSide};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixed thresholds of the simulated book, all in quote currency or whole percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLimits {
    /// Entries whose margin would fall below this are skipped.
    pub min_margin: Decimal,
    /// Close when `pnl_percent <= -stop_loss_pct`.
    pub stop_loss_pct: Decimal,
    /// Close when `pnl_percent >= take_profit_pct`.
    pub take_profit_pct: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            min_margin: dec!(5),
            stop_loss_pct: dec!(5),
            take_profit_pct: dec!(12),
        }
    }
}

/// A simple, concrete implementation of the `RiskManager` trait.
///
/// Margin is a fixed percentage of the available balance. Exits are fixed
/// stop-loss / take-profit thresholds on the leveraged return.
#[derive(Debug, Clone, Default)]
pub struct SimpleRiskManager {
    limits: RiskLimits,
}

impl SimpleRiskManager {
    /// Creates a new `SimpleRiskManager` with the given limits.
    pub fn new(limits: RiskLimits) -> Result<Self, RiskError> {
        // Validate that risk parameters are logical.
        if limits.min_margin.is_sign_negative() {
            return Err(RiskError::InvalidParameters(
                "min_margin cannot be negative".to_string(),
            ));
        }
        if limits.stop_loss_pct <= dec!(0) || limits.take_profit_pct <= dec!(0) {
            return Err(RiskError::InvalidParameters(
                "stop_loss_pct and take_profit_pct must be greater than 0".to_string(),
            ));
        }
        Ok(Self { limits })
    }

    pub fn limits(&self) -> RiskLimits {
        self.limits
    }
}

impl RiskManager for SimpleRiskManager {
    fn has_capacity(&self, open_positions: usize, config: &BotConfig) -> bool {
        open_positions < config.max_positions
    }

    fn evaluate_entry(
        &self,
        pair: &MarketPair,
        side: PositionSide,
        account: AccountView,
        config: &BotConfig,
    ) -> Result<EntryOrder, RiskError> {
        // --- 1. Validation ---
        if pair.price <= dec!(0) {
            return Err(RiskError::InvalidEntryPrice(pair.price));
        }
        if !self.has_capacity(account.open_positions, config) {
            return Err(RiskError::MaxPositionsReached(config.max_positions));
        }

        // --- 2. Size the margin as a share of the available balance ---
        let margin = account.balance * config.trade_amount_percent / dec!(100);
        if margin < self.limits.min_margin {
            return Err(RiskError::BelowMinimumMargin {
                margin,
                minimum: self.limits.min_margin,
            });
        }
        if margin > account.balance {
            return Err(RiskError::InsufficientBalance {
                margin,
                available: account.balance,
            });
        }

        Ok(EntryOrder {
            symbol: pair.symbol.clone(),
            side,
            entry_price: pair.price,
            margin,
            leverage: config.leverage,
        })
    }

    fn exit_reason(&self, position: &Position) -> Option<CloseReason> {
        // Stop-loss is checked first. The two bands cannot overlap.
        if position.pnl_percent <= -self.limits.stop_loss_pct {
            Some(CloseReason::StopLoss)
        } else if position.pnl_percent >= self.limits.take_profit_pct {
            Some(CloseReason::TakeProfit)
        } else {
            None
        }
    }
}
