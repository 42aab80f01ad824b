//! # Harmonic Events
//!
//! This crate defines what the simulation engine hands back to its caller: the
//! activity log entries emitted during a tick and the read-only snapshot of
//! market, positions, balance and ledger that a renderer draws from.
//!
//! As a Layer 0 crate, it depends only on `core-types`.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{EngineSnapshot, LogLevel, LogMessage};
