//! Asset-ownership registry abstraction.

use async_trait::async_trait;

use crate::error::MarketResult;
use crate::types::{AccountId, AssetId, CollectionId};

/// Abstraction over the external registry that tracks ownership of
/// unique assets.
///
/// The market never mints assets; it only moves existing ones in and out
/// of its own custody. Custody transfers are authorized on the registry
/// side: moving an asset out of an account requires that account to be
/// the current owner and the market to be an approved custodian.
#[async_trait]
pub trait AssetRegistry: Send + Sync {
    /// Current owner of an asset.
    ///
    /// Fails with `NotFound` for an asset the registry does not know.
    async fn owner_of(&self, collection: CollectionId, asset: AssetId)
        -> MarketResult<AccountId>;

    /// Transfer custody of an asset from `from` to `to`.
    ///
    /// Fails with `Unauthorized` if `from` is not the current owner and
    /// with `NotApproved` if the initiating custodian lacks approval.
    async fn transfer_custody(
        &self,
        collection: CollectionId,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
    ) -> MarketResult<()>;

    /// Whether `operator` may move assets on behalf of `owner`.
    async fn is_approved_for_all(
        &self,
        owner: AccountId,
        operator: AccountId,
    ) -> MarketResult<bool>;
}
