//! Fungible-value ledger abstraction.

use async_trait::async_trait;

use crate::error::MarketResult;
use crate::types::{AccountId, Amount, CurrencyId};

/// Abstraction over the external ledger that settles fungible value.
///
/// The market pulls funds into its custody account under an allowance
/// the payer granted beforehand, and pushes funds out of custody when
/// settling or refunding. Settlement itself (the payment rail) lives
/// entirely behind this trait.
#[async_trait]
pub trait FungibleLedger: Send + Sync {
    /// Balance of `account` in `currency`.
    async fn balance_of(&self, account: AccountId, currency: CurrencyId)
        -> MarketResult<Amount>;

    /// Remaining allowance `owner` has granted to `spender`.
    async fn allowance_of(
        &self,
        owner: AccountId,
        spender: AccountId,
        currency: CurrencyId,
    ) -> MarketResult<Amount>;

    /// Move `amount` from `from` into `to`, gated by the allowance `from`
    /// granted to `to`.
    ///
    /// Fails with `InsufficientFunds` on a balance shortfall and
    /// `NotApproved` on a missing or exhausted allowance.
    async fn pull(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()>;

    /// Move `amount` out of the market's custody to `to`.
    async fn push(&self, to: AccountId, amount: Amount, currency: CurrencyId)
        -> MarketResult<()>;
}
