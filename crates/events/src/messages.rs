use crate::error::EventsError;
use chrono::{DateTime, Utc};
use core_types::{MarketPair, Position, TradeHistory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Classification of an activity log entry, as shown on the dashboard feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

/// A single entry of the engine's activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogMessage {
    /// An entry stamped with the wall clock. Use [`LogMessage::at`] to stamp it
    /// with the time of the event it reports instead.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Restamps the entry.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<7} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// A complete, owned snapshot of the engine after a call.
/// This message provides a renderer with everything the main dashboard shows.
///
/// `logs` holds only the entries emitted by the call that produced the snapshot;
/// accumulating a longer activity window is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub market: Vec<MarketPair>,
    pub positions: Vec<Position>,
    pub balance: Decimal,
    pub logs: Vec<LogMessage>,
    /// Closed trades, newest first. Shared with the engine's ledger, so taking
    /// a snapshot never copies the trades; the engine copies the ledger on the
    /// next close only if this snapshot is still alive then.
    pub history: Arc<VecDeque<TradeHistory>>,
}

impl EngineSnapshot {
    /// Sum of the unrealized P&L across all open positions.
    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.pnl).sum()
    }

    /// Margin currently locked in open positions.
    pub fn committed_margin(&self) -> Decimal {
        self.positions.iter().map(|p| p.amount).sum()
    }

    /// What the account would hold if every position were closed at the current prices.
    pub fn equity(&self) -> Decimal {
        self.balance + self.committed_margin() + self.unrealized_pnl()
    }

    /// Sum of the P&L of every closed trade.
    pub fn realized_pnl(&self) -> Decimal {
        self.history.iter().map(|t| t.pnl).sum()
    }

    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
