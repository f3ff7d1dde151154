use crate::core::Amount;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LedgerError {
    /// Occurs when an amount is zero, negative, or not a finite number.
    #[error("please enter a valid positive number (got {0})")]
    InvalidAmount(Amount),
    /// Occurs when a withdrawal exceeds the current balance.
    #[error("insufficient funds: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds {
        requested: Amount,
        available: Amount
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
