//! # Harmonic Signal Library
//!
//! This crate contains the signal-generation side of the simulator. It defines a
//! universal `SignalGenerator` trait and the `HarmonicScanner`, a stochastic
//! stand-in for harmonic pattern recognition.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of balances,
//!   positions or execution. It depends only on `core-types`.
//! - **Injected Randomness:** The scanner never reaches for a global random source.
//!   It owns whatever `RngCore` it is given, so a seeded generator replays the exact
//!   same signal sequence.
//!
//! ## Public API
//!
//! - `SignalGenerator`: The core trait the execution engine calls once per pair per tick.
//! - `HarmonicScanner`: The default implementation.
//! - `create_signal_generator`: The factory function used by the engine and the runner.

// Declare all the modules that constitute this crate.
pub mod error;
pub mod factory;
pub mod harmonic;

// Re-export the key components to create a clean, public-facing API.
pub use error::StrategyError;
pub use factory::create_signal_generator;
pub use harmonic::{HarmonicScanner, ScannerParams};

use core_types::{MarketPair, Signal, StrategyKind};

/// The core trait that all signal generators must implement.
///
/// `&mut self` lets implementations advance their own random source or state.
/// The `Send` bound lets an engine that owns a generator move between tasks.
pub trait SignalGenerator: Send {
    /// Looks at one pair and optionally recommends a direction.
    ///
    /// # Returns
    ///
    /// * `Some(Signal)` - a pattern was detected on `pair`.
    /// * `None` - nothing to do for this pair on this tick.
    fn analyze(&mut self, pair: &MarketPair, strategy: StrategyKind) -> Option<Signal>;
}

impl<G: SignalGenerator + ?Sized> SignalGenerator for Box<G> {
    fn analyze(&mut self, pair: &MarketPair, strategy: StrategyKind) -> Option<Signal> {
        (**self).analyze(pair, strategy)
    }
}
