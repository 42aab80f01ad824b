use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::{Position, TradeHistory};
use events::EngineSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

/// Most recent trades shown in the history table.
pub const HISTORY_ROWS: usize = 20;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pnl_cell(value: Decimal, suffix: &str) -> Cell {
    let cell = Cell::new(format!("{:+.2}{}", value, suffix));
    if value > Decimal::ZERO {
        cell.fg(Color::Green)
    } else if value < Decimal::ZERO {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

pub fn positions_table(positions: &[Position]) -> Table {
    let mut table = new_table(vec!["Symbol", "Side", "Entry", "Mark", "Margin", "Lev", "PnL", "PnL %"]);
    for position in positions {
        table.add_row(vec![
            Cell::new(&position.symbol),
            Cell::new(position.side),
            Cell::new(format!("{:.4}", position.entry_price)),
            Cell::new(format!("{:.4}", position.current_price)),
            Cell::new(format!("{:.2}", position.amount)),
            Cell::new(format!("{}x", position.leverage)),
            pnl_cell(position.pnl, ""),
            pnl_cell(position.pnl_percent, "%"),
        ]);
    }
    table
}

pub fn history_table(history: &VecDeque<TradeHistory>) -> Table {
    let mut table = new_table(vec!["Closed", "Symbol", "Side", "Entry", "Exit", "PnL", "Reason"]);
    for trade in history.iter().take(HISTORY_ROWS) {
        table.add_row(vec![
            Cell::new(trade.closed_at.format("%H:%M:%S")),
            Cell::new(&trade.symbol),
            Cell::new(trade.side),
            Cell::new(format!("{:.4}", trade.entry_price)),
            Cell::new(format!("{:.4}", trade.exit_price)),
            pnl_cell(trade.pnl, ""),
            Cell::new(trade.close_reason),
        ]);
    }
    table
}

/// Aggregate account figures for the end-of-run report.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub starting_balance: Decimal,
    pub balance: Decimal,
    pub equity: Decimal,
    pub realized_pnl: Decimal,
    pub trades: usize,
    pub winners: usize,
    pub open_positions: usize,
}

impl Summary {
    pub fn from_snapshot(starting_balance: Decimal, snapshot: &EngineSnapshot) -> Self {
        Self {
            starting_balance,
            balance: snapshot.balance,
            equity: snapshot.equity(),
            realized_pnl: snapshot.realized_pnl(),
            trades: snapshot.history.len(),
            winners: snapshot.history.iter().filter(|t| t.pnl > Decimal::ZERO).count(),
            open_positions: snapshot.positions.len(),
        }
    }

    /// Percentage of closed trades with a positive result. `None` before the first close.
    pub fn win_rate(&self) -> Option<Decimal> {
        (self.trades > 0).then(|| Decimal::from(self.winners) / Decimal::from(self.trades) * dec!(100))
    }

    /// Equity change relative to the starting balance, in percent.
    pub fn return_percent(&self) -> Option<Decimal> {
        (!self.starting_balance.is_zero())
            .then(|| (self.equity - self.starting_balance) / self.starting_balance * dec!(100))
    }

    pub fn to_table(&self) -> Table {
        let mut table = new_table(vec!["Metric", "Value"]);
        let win_rate = self
            .win_rate()
            .map_or_else(|| "n/a".to_string(), |rate| format!("{:.1}%", rate));
        let return_pct = self
            .return_percent()
            .map_or_else(|| "n/a".to_string(), |pct| format!("{:+.2}%", pct));
        table
            .add_row(vec![Cell::new("Starting balance"), Cell::new(format!("{:.2} USDT", self.starting_balance))])
            .add_row(vec![Cell::new("Balance"), Cell::new(format!("{:.2} USDT", self.balance))])
            .add_row(vec![Cell::new("Equity"), Cell::new(format!("{:.2} USDT", self.equity))])
            .add_row(vec![Cell::new("Realized PnL"), pnl_cell(self.realized_pnl, " USDT")])
            .add_row(vec![Cell::new("Return"), Cell::new(return_pct)])
            .add_row(vec![Cell::new("Closed trades"), Cell::new(self.trades)])
            .add_row(vec![Cell::new("Win rate"), Cell::new(win_rate)])
            .add_row(vec![Cell::new("Open positions"), Cell::new(self.open_positions)]);
        table
    }
}
