//! Error types for the keeper

use thiserror::Error;

/// Result type for keeper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Keeper errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger_core::Error),

    /// Perform was invoked while the due-check is false
    #[error("Upkeep not due: {0}")]
    UpkeepNotDue(String),

    /// Poll interval must be positive
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Caller is not the keeper owner
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
