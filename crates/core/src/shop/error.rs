use thiserror::Error;

/// Errors raised when a shop document fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Order must contain at least one line")]
    EmptyOrder,
    #[error("Order line quantity must be greater than zero")]
    ZeroQuantity,
    #[error("Shift must end after it starts")]
    InvalidShiftRange,
}
