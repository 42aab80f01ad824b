use crate::error::ExecutorError;
use chrono::{DateTime, Utc};
use core_types::{CloseReason, Position, TradeHistory};
use risk::EntryOrder;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;

/// Manages the state of the simulated account: cash, open positions and closed trades.
/// Its sole responsibility is to apply opens and closes consistently.
#[derive(Debug, Clone)]
pub struct Portfolio {
    balance: Decimal,
    /// Open positions in the order they were opened.
    positions: Vec<Position>,
    /// Closed trades, newest first. Never evicted. Shared with snapshots, so
    /// handing it out is O(1); a close only copies it while a snapshot still holds it.
    history: Arc<VecDeque<TradeHistory>>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting capital.
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            positions: Vec::new(),
            history: Arc::new(VecDeque::new()),
        }
    }

    /// Cash not committed as margin to any open position.
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn history(&self) -> &VecDeque<TradeHistory> {
        &self.history
    }

    /// A shared handle to the ledger as it is now.
    pub fn ledger(&self) -> Arc<VecDeque<TradeHistory>> {
        Arc::clone(&self.history)
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_position_for(&self, symbol: &str) -> bool {
        self.positions.iter().any(|p| p.symbol == symbol)
    }

    /// Applies an approved entry: debits the margin and adds a flat position.
    pub fn open(&mut self, order: EntryOrder, opened_at: DateTime<Utc>) -> Result<&Position, ExecutorError> {
        if order.margin > self.balance {
            return Err(ExecutorError::InsufficientCash {
                required: order.margin.to_string(),
                available: self.balance.to_string(),
            });
        }
        if self.has_position_for(&order.symbol) {
            return Err(ExecutorError::DuplicatePosition(order.symbol));
        }

        let position = Position::open(
            order.symbol,
            order.side,
            order.entry_price,
            order.margin,
            order.leverage,
            opened_at,
        );
        self.balance -= position.amount;
        self.positions.push(position);

        // Just pushed, so the book is not empty.
        Ok(&self.positions[self.positions.len() - 1])
    }

    /// Revalues every open position. Symbols `price_of` cannot quote keep their last price.
    ///
    /// Returns the symbols whose quote implied a return too large to represent;
    /// those positions keep their previous valuation.
    pub fn mark_to_market<F>(&mut self, mut price_of: F) -> Vec<String>
    where
        F: FnMut(&str) -> Option<Decimal>,
    {
        let mut unrepresentable = Vec::new();
        for position in &mut self.positions {
            let price = price_of(&position.symbol).unwrap_or(position.current_price);
            if !position.revalue(price) {
                unrepresentable.push(position.symbol.clone());
            }
        }
        unrepresentable
    }

    /// Closes every position for which `should_close` returns a reason, in book order.
    pub fn close_where<F>(&mut self, mut should_close: F, closed_at: DateTime<Utc>) -> Vec<TradeHistory>
    where
        F: FnMut(&Position) -> Option<CloseReason>,
    {
        let mut closed = Vec::new();
        let mut kept = Vec::with_capacity(self.positions.len());
        for position in std::mem::take(&mut self.positions) {
            match should_close(&position) {
                Some(reason) => closed.push(self.settle(position, reason, closed_at)),
                None => kept.push(position),
            }
        }
        self.positions = kept;
        closed
    }

    /// Closes the whole book regardless of P&L.
    pub fn close_all(&mut self, reason: CloseReason, closed_at: DateTime<Utc>) -> Vec<TradeHistory> {
        self.close_where(|_| Some(reason), closed_at)
    }

    fn settle(&mut self, position: Position, reason: CloseReason, closed_at: DateTime<Utc>) -> TradeHistory {
        self.balance += position.settlement_value();
        let trade = position.close(reason, closed_at);
        Arc::make_mut(&mut self.history).push_front(trade.clone());
        trade
    }
}
