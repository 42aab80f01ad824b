use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an entry is refused. The engine treats every variant as a silent skip.
#[derive(Error, Debug, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("Margin {margin} is below the minimum trade size of {minimum}.")]
    BelowMinimumMargin { margin: Decimal, minimum: Decimal },

    #[error("Margin {margin} exceeds the available balance of {available}.")]
    InsufficientBalance { margin: Decimal, available: Decimal },

    #[error("Already holding the maximum of {0} open positions.")]
    MaxPositionsReached(usize),

    #[error("The provided entry price ({0}) is zero or negative.")]
    InvalidEntryPrice(Decimal),
}
