//! Error types for tunecraft storage and ledger operations.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend operation failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors returned by the credit ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Balance is below the cost of a generation.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: u64,
        /// Required amount.
        required: u64,
    },

    /// The session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
