/// Domain-specific error types for the marketplace core.
///
/// Every operation fails synchronously with one of these variants and
/// leaves no partial state behind. The detail string carries enough
/// context to tell failures of the same kind apart.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Unknown asset id or record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller lacks the required role (offeror, current bidder, invited buyer).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Non-positive price/amount, past or zero deadline, bad fee rate.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Wrong lifecycle state for the requested operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Bid below the reserve or below the current highest bid.
    #[error("bid too low: {0}")]
    BidTooLow(String),

    /// The auction deadline has already passed.
    #[error("deadline passed: {0}")]
    DeadlinePassed(String),

    /// The auction deadline has not been reached yet.
    #[error("deadline not reached: {0}")]
    DeadlineNotReached(String),

    /// Fungible pull failed because the payer's balance is short.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// External custody/allowance check refused the transfer.
    #[error("not approved: {0}")]
    NotApproved(String),

    /// Persistence snapshot could not be written or read.
    #[error("storage failed: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias.
pub type MarketResult<T> = Result<T, MarketError>;
