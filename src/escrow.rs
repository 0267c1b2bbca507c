//! Escrow coordination over the external asset registry and fungible ledger.
//!
//! Every custody change an operation needs goes through this coordinator
//! so that asset and fund movement stays paired with the state mutation
//! it accompanies. The coordinator itself holds no state beyond the
//! collaborator handles and the market's custody account.

use tracing::debug;

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};
use crate::fees::{split_fee, FeeSplit};
use crate::traits::{AssetRegistry, FungibleLedger};
use crate::types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};

pub struct EscrowCoordinator<R, L>
where
    R: AssetRegistry,
    L: FungibleLedger,
{
    registry: R,
    ledger: L,
    config: MarketConfig,
}

impl<R, L> EscrowCoordinator<R, L>
where
    R: AssetRegistry,
    L: FungibleLedger,
{
    pub fn new(registry: R, ledger: L, config: MarketConfig) -> Self {
        Self {
            registry,
            ledger,
            config,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Verify that `expected` currently owns the asset on the registry.
    pub async fn verify_owner(
        &self,
        collection: CollectionId,
        asset: AssetId,
        expected: AccountId,
    ) -> MarketResult<()> {
        let owner = self.registry.owner_of(collection, asset).await?;
        if owner != expected {
            return Err(MarketError::Unauthorized(format!(
                "account {expected} does not own asset {asset}"
            )));
        }
        Ok(())
    }

    /// Verify the payer can cover `amount` and has granted custody a
    /// sufficient allowance, before any funds move.
    ///
    /// Part of the check phase: both ways a pull can fail (balance
    /// shortfall, missing allowance) are detected here, before the
    /// operation performs any external mutation.
    pub async fn verify_funds(
        &self,
        payer: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()> {
        let balance = self.ledger.balance_of(payer, currency).await?;
        if balance < amount {
            return Err(MarketError::InsufficientFunds(format!(
                "account {payer} holds {balance}, needs {amount}"
            )));
        }
        let allowance = self
            .ledger
            .allowance_of(payer, self.config.custody, currency)
            .await?;
        if allowance < amount {
            return Err(MarketError::NotApproved(format!(
                "account {payer} granted allowance {allowance}, needs {amount}"
            )));
        }
        Ok(())
    }

    /// Move an asset from its owner into market custody.
    pub async fn take_asset(
        &self,
        collection: CollectionId,
        asset: AssetId,
        from: AccountId,
    ) -> MarketResult<()> {
        debug!(asset = %asset, from = %from, "taking asset into escrow");
        self.registry
            .transfer_custody(collection, asset, from, self.config.custody)
            .await
    }

    /// Release an asset from market custody to `to`.
    pub async fn release_asset(
        &self,
        collection: CollectionId,
        asset: AssetId,
        to: AccountId,
    ) -> MarketResult<()> {
        debug!(asset = %asset, to = %to, "releasing asset from escrow");
        self.registry
            .transfer_custody(collection, asset, self.config.custody, to)
            .await
    }

    /// Pull `amount` from `payer` into market custody.
    pub async fn lock_funds(
        &self,
        payer: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()> {
        debug!(payer = %payer, amount, "locking funds in escrow");
        self.ledger
            .pull(payer, self.config.custody, amount, currency)
            .await
    }

    /// Return escrowed funds to `to` in full.
    pub async fn refund(
        &self,
        to: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<()> {
        debug!(to = %to, amount, "refunding escrowed funds");
        self.ledger.push(to, amount, currency).await
    }

    /// Split `amount` at the configured fee rate and pay it out of
    /// custody: fee to the operator, remainder to `payee`.
    ///
    /// Callers that settle from a live balance pull the full amount into
    /// custody first (`lock_funds`); auction settlement pays out of the
    /// bid already held.
    pub async fn disburse(
        &self,
        payee: AccountId,
        amount: Amount,
        currency: CurrencyId,
    ) -> MarketResult<FeeSplit> {
        let split = split_fee(amount, self.config.fee_bps);
        debug!(payee = %payee, fee = split.fee, remainder = split.remainder, "disbursing settlement");
        self.ledger
            .push(self.config.operator, split.fee, currency)
            .await?;
        self.ledger.push(payee, split.remainder, currency).await?;
        Ok(split)
    }
}
