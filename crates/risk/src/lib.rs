//! # Harmonic Risk
//!
//! Entry sizing and exit rules for the simulated position book. The engine asks
//! a `RiskManager` two questions: how much margin a new signal gets (if any),
//! and whether an open position has crossed a close threshold.

pub mod error;
pub mod simple_manager;

pub use error::RiskError;
pub use simple_manager::{RiskLimits, SimpleRiskManager};

use configuration::BotConfig;
use core_types::{CloseReason, MarketPair, Position, PositionSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The slice of account state entry sizing needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountView {
    /// Available cash, excluding margin already committed.
    pub balance: Decimal,
    pub open_positions: usize,
}

/// A sized, approved entry. Applying it is the position book's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOrder {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_price: Decimal,
    pub margin: Decimal,
    pub leverage: u32,
}

pub trait RiskManager: Send + Sync {
    /// True while another position may be opened under `config.max_positions`.
    fn has_capacity(&self, open_positions: usize, config: &BotConfig) -> bool;

    /// Sizes an entry on `pair` for `side`, or explains why it is refused.
    fn evaluate_entry(
        &self,
        pair: &MarketPair,
        side: PositionSide,
        account: AccountView,
        config: &BotConfig,
    ) -> Result<EntryOrder, RiskError>;

    /// The close trigger `position` has hit, if any.
    fn exit_reason(&self, position: &Position) -> Option<CloseReason>;
}
