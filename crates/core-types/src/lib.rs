pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{CloseReason, PositionSide, StrategyKind};
pub use error::CoreError;
pub use structs::{
    clamp_momentum, MarketPair, Position, TickerUpdate, TradeHistory, MOMENTUM_CEILING,
    MOMENTUM_FLOOR, MOMENTUM_NEUTRAL, Signal,
};
