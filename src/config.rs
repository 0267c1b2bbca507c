//! Marketplace configuration.
//!
//! Centralizes the accounts and fee rate the market is initialized with,
//! mirroring the operator parameters the system is deployed against.

use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};
use crate::fees::BPS_DENOMINATOR;
use crate::types::{AccountId, Amount};

/// Smallest bid the reserve of an auction may be set to.
pub const MIN_AUCTION_OFFER: Amount = 1;

/// Static configuration for one market instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Account that receives the operator fee on every value transfer.
    pub operator: AccountId,

    /// Account holding escrowed funds and asset custody for the market.
    pub custody: AccountId,

    /// Fee rate in basis points (10000 = 100%).
    pub fee_bps: u16,
}

impl MarketConfig {
    pub fn new(operator: AccountId, custody: AccountId, fee_bps: u16) -> MarketResult<Self> {
        if u128::from(fee_bps) > BPS_DENOMINATOR {
            return Err(MarketError::InvalidParameter(format!(
                "fee rate {fee_bps} exceeds {BPS_DENOMINATOR} basis points"
            )));
        }
        Ok(Self {
            operator,
            custody,
            fee_bps,
        })
    }
}
