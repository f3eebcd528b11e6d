//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount is zero or would overflow a balance
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Account balance or pool custody cannot cover the request
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Recipient is the reserved null identity
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Transfer where sender and recipient coincide
    #[error("Self transfer: {0}")]
    SelfTransfer(String),

    /// External payout refused; state was rolled back
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Pool is empty
    #[error("No funds: {0}")]
    NoFunds(String),

    /// Caller is not the ledger owner
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
