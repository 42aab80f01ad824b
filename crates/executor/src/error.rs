use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExecutorError {
    #[error("Not enough cash available to open position. Required: {required}, Available: {available}")]
    InsufficientCash { required: String, available: String },

    #[error("A position is already open for symbol: {0}")]
    DuplicatePosition(String),
}
