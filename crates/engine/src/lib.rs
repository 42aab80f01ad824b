//! # Harmonic Engine
//!
//! The `ExecutionEngine` owns every piece of simulation state (market, book,
//! ledger, balance, configuration) and advances it one tick at a time.
//!
//! There is no global instance and no interior locking. The caller owns the
//! engine and serializes every call, so a feed update can never interleave with
//! a tick. Every operation is infallible from the caller's point of view: guard
//! failures become silent skips and missing quotes fall back to the last price.

use chrono::{DateTime, Utc};
use configuration::BotConfig;
use core_types::{CloseReason, MarketPair, Position, TickerUpdate, TradeHistory};
use events::{EngineSnapshot, LogMessage};
use executor::Portfolio;
use risk::{AccountView, RiskManager, SimpleRiskManager};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use strategies::{create_signal_generator, SignalGenerator};

pub mod market;
pub mod seed;

pub use market::MarketSnapshotStore;
pub use seed::{base_price, seed_market};

/// The central orchestrator of the simulation.
pub struct ExecutionEngine {
    // --- Configuration ---
    config: BotConfig,

    // --- State ---
    market: MarketSnapshotStore,
    portfolio: Portfolio,

    // --- Pluggable Components ---
    signals: Box<dyn SignalGenerator>,
    risk_manager: Box<dyn RiskManager>,
}

impl ExecutionEngine {
    /// Creates a new engine from seed data, a starting balance, the initial
    /// configuration and the signal source to use.
    pub fn initialize(
        seed_market: Vec<MarketPair>,
        seed_balance: Decimal,
        initial_config: BotConfig,
        signals: Box<dyn SignalGenerator>,
    ) -> Self {
        let market = MarketSnapshotStore::new(seed_market);
        tracing::info!(
            pairs = market.len(),
            balance = %seed_balance,
            strategy = %initial_config.strategy,
            "Execution engine initialised."
        );
        Self {
            config: initial_config,
            market,
            portfolio: Portfolio::new(seed_balance),
            signals,
            risk_manager: Box::new(SimpleRiskManager::default()),
        }
    }

    /// Same as `initialize`, with the default harmonic scanner. A seed makes the
    /// whole signal sequence reproducible.
    pub fn with_seed(
        seed_market: Vec<MarketPair>,
        seed_balance: Decimal,
        initial_config: BotConfig,
        rng_seed: Option<u64>,
    ) -> Self {
        Self::initialize(
            seed_market,
            seed_balance,
            initial_config,
            create_signal_generator(rng_seed),
        )
    }

    /// Replaces the configuration wholesale. Positions already open keep the
    /// leverage they were opened with.
    pub fn update_config(&mut self, new_config: BotConfig) {
        if new_config != self.config {
            tracing::debug!(?new_config, "Bot configuration replaced.");
        }
        self.config = new_config;
    }

    /// Feed-update entry point. See `MarketSnapshotStore::replace`.
    pub fn set_market_data(&mut self, tickers: Vec<TickerUpdate>) {
        self.market.replace(tickers);
        tracing::trace!(pairs = self.market.len(), "Market data replaced.");
    }

    /// Advances the simulation by one period.
    ///
    /// 1. Marks every open position to market.
    /// 2. If running and below the position cap, scans each free pair for a
    ///    signal and opens positions, re-checking the cap before every open.
    /// 3. Closes every position (including ones opened in step 2) that crossed
    ///    its stop-loss or take-profit threshold. This step runs even when paused.
    ///
    /// The returned snapshot's `logs` holds only the entries emitted by this call,
    /// all stamped with the tick's time.
    pub fn tick(&mut self) -> EngineSnapshot {
        let now = Utc::now();
        let mut logs = Vec::new();

        let market = &self.market;
        let unrepresentable = self.portfolio.mark_to_market(|symbol| market.price_of(symbol));
        if !unrepresentable.is_empty() {
            tracing::warn!(
                symbols = ?unrepresentable,
                "Quote implies a return too large to represent; keeping the previous valuation."
            );
        }

        if self.config.is_running
            && self.risk_manager.has_capacity(self.portfolio.open_count(), &self.config)
        {
            self.run_signal_phase(now, &mut logs);
        }

        self.run_exit_phase(now, &mut logs);

        self.snapshot_with(logs)
    }

    /// Emergency stop: closes every open position at its last marked price,
    /// regardless of thresholds, and returns one summary entry. Safe to call on
    /// an empty book.
    pub fn close_all_positions(&mut self) -> LogMessage {
        let now = Utc::now();
        let closed = self.portfolio.close_all(CloseReason::Emergency, now);
        let total_pnl: Decimal = closed.iter().map(|trade| trade.pnl).sum();

        tracing::warn!(
            closed = closed.len(),
            total_pnl = %total_pnl,
            balance = %self.portfolio.balance(),
            "Emergency stop executed."
        );

        LogMessage::warning(format!(
            "EMERGENCY STOP: {} positions closed. Total PnL: {:.2}",
            closed.len(),
            total_pnl
        ))
        .at(now)
    }

    /// The current state without advancing the simulation. `logs` is empty.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshot_with(Vec::new())
    }

    pub fn balance(&self) -> Decimal {
        self.portfolio.balance()
    }

    pub fn positions(&self) -> &[Position] {
        self.portfolio.positions()
    }

    /// Closed trades, newest first.
    pub fn history(&self) -> &VecDeque<TradeHistory> {
        self.portfolio.history()
    }

    pub fn market(&self) -> &[MarketPair] {
        self.market.pairs()
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    fn run_signal_phase(&mut self, now: DateTime<Utc>, logs: &mut Vec<LogMessage>) {
        let Self {
            config,
            market,
            portfolio,
            signals,
            risk_manager,
        } = self;

        for pair in market.pairs() {
            if portfolio.has_position_for(&pair.symbol) {
                continue;
            }
            let Some(signal) = signals.analyze(pair, config.strategy) else {
                continue;
            };
            logs.push(LogMessage::info(signal.describe()).at(now));

            let account = AccountView {
                balance: portfolio.balance(),
                open_positions: portfolio.open_count(),
            };
            let order = match risk_manager.evaluate_entry(pair, signal.side, account, config) {
                Ok(order) => order,
                Err(reason) => {
                    tracing::debug!(symbol = %pair.symbol, %reason, "Entry skipped.");
                    continue;
                }
            };

            match portfolio.open(order, now) {
                Ok(position) => {
                    tracing::info!(
                        symbol = %position.symbol,
                        side = %position.side,
                        price = %position.entry_price,
                        margin = %position.amount,
                        leverage = position.leverage,
                        "Position opened."
                    );
                    logs.push(
                        LogMessage::success(format!(
                            "Harmonic entry: {} on {} @ ${:.4}",
                            position.side, position.symbol, position.entry_price
                        ))
                        .at(position.opened_at),
                    );
                }
                Err(e) => {
                    tracing::warn!(symbol = %pair.symbol, error = %e, "Approved entry could not be applied.");
                }
            }
        }
    }

    fn run_exit_phase(&mut self, now: DateTime<Utc>, logs: &mut Vec<LogMessage>) {
        let risk_manager = &self.risk_manager;
        let closed = self
            .portfolio
            .close_where(|position| risk_manager.exit_reason(position), now);

        for trade in closed {
            tracing::info!(
                symbol = %trade.symbol,
                reason = %trade.close_reason,
                exit = %trade.exit_price,
                pnl = %trade.pnl,
                "Position closed."
            );
            logs.push(close_log(&trade));
        }
    }

    fn snapshot_with(&self, logs: Vec<LogMessage>) -> EngineSnapshot {
        EngineSnapshot {
            market: self.market.pairs().to_vec(),
            positions: self.portfolio.positions().to_vec(),
            balance: self.portfolio.balance(),
            logs,
            history: self.portfolio.ledger(),
        }
    }
}

/// Activity entry for a threshold close: SUCCESS on a gain, WARNING otherwise.
fn close_log(trade: &TradeHistory) -> LogMessage {
    let sign = if trade.pnl > Decimal::ZERO { "+" } else { "" };
    let message = format!(
        "{}: {} ({}{:.2} USDT)",
        trade.close_reason.label(),
        trade.symbol,
        sign,
        trade.pnl
    );
    let log = if trade.pnl > Decimal::ZERO {
        LogMessage::success(message)
    } else {
        LogMessage::warning(message)
    };
    log.at(trade.closed_at)
}
