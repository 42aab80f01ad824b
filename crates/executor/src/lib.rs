//! # Harmonic Executor Crate
//!
//! This crate owns the simulated account: the available balance, the book of
//! open positions and the ledger of closed trades.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** Deciding *whether* to open or close is the
//!   job of the `risk` crate. The `Portfolio` is the state machine that applies
//!   those decisions to the balance, the book and the ledger.
//! - **Conservation:** Opening moves margin from the balance into a position;
//!   closing moves margin plus P&L back. Nothing else touches the balance.
//!
//! ## Public API
//!
//! - `Portfolio`: The in-memory state manager for the simulated account.
//! - `ExecutorError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod portfolio;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use portfolio::Portfolio;
