//! Invite-only listings: same lifecycle as the public store without
//! auction support, plus the invited-buyer access check.

use tracing::info;

use crate::error::{MarketError, MarketResult};
use crate::events::MarketEvent;
use crate::marketplace::item::PrivateMarketItem;
use crate::marketplace::Market;
use crate::traits::{AssetRegistry, FungibleLedger, TimeProvider};
use crate::types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};

impl<R, L, T> Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    /// List an asset for sale to a single invited buyer.
    pub async fn create_private_market_item(
        &self,
        collection: CollectionId,
        asset_id: AssetId,
        price: Amount,
        currency: CurrencyId,
        invited_buyer: AccountId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        if self.state.read().has_active_listing(asset_id) {
            return Err(MarketError::Conflict(format!(
                "an active listing already exists for asset {asset_id}"
            )));
        }
        self.escrow.verify_owner(collection, asset_id, caller).await?;

        // act
        self.escrow.take_asset(collection, asset_id, caller).await?;

        // commit
        let item = PrivateMarketItem {
            collection,
            asset_id,
            price,
            currency,
            offeror: caller,
            owner: None,
            invited_buyer,
        };
        self.commit(
            move |state| {
                state.private_items.insert(asset_id, item);
            },
            vec![
                MarketEvent::MarketItemCreated {
                    collection,
                    asset_id,
                    offeror: caller,
                    owner: None,
                    price,
                    currency,
                    is_auction: false,
                    minimum_offer: 0,
                    auction_deadline: 0,
                },
                MarketEvent::OfferUpdated {
                    asset_id,
                    offeror: Some(caller),
                    minimum_offer: 0,
                    invited_bidder: Some(invited_buyer),
                },
            ],
        );
        info!(asset = %asset_id, offeror = %caller, buyer = %invited_buyer, "private market item created");
        Ok(())
    }

    /// Look up a private listing record, active or historical.
    pub fn get_private_market_item(&self, asset_id: AssetId) -> MarketResult<PrivateMarketItem> {
        self.state
            .read()
            .private_items
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound("asset id not found in the private market".into()))
    }

    /// Take an active private listing off the market and return the
    /// asset to the offeror.
    pub async fn remove_private_market_item(
        &self,
        asset_id: AssetId,
        collection: CollectionId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.get_private_market_item(asset_id)?;
        if !item.is_active() {
            return Err(MarketError::Conflict(format!(
                "private listing for asset {asset_id} is no longer active"
            )));
        }
        if item.offeror != caller {
            return Err(MarketError::Unauthorized(
                "you are not the offeror of this asset".into(),
            ));
        }

        // act
        self.escrow
            .release_asset(collection, asset_id, item.offeror)
            .await?;

        // commit
        let offeror = item.offeror;
        self.commit(
            move |state| {
                if let Some(record) = state.private_items.get_mut(&asset_id) {
                    record.owner = Some(offeror);
                }
            },
            vec![MarketEvent::MarketItemRemoved {
                collection,
                asset_id,
            }],
        );
        info!(asset = %asset_id, "private market item removed");
        Ok(())
    }

    /// Settle a private listing. Only the invited buyer may purchase;
    /// settlement is otherwise identical to a direct market sale.
    pub async fn create_private_market_sale(
        &self,
        asset_id: AssetId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.get_private_market_item(asset_id)?;
        if !item.is_active() {
            return Err(MarketError::Conflict(format!(
                "private listing for asset {asset_id} is no longer active"
            )));
        }
        if item.invited_buyer != caller {
            return Err(MarketError::Unauthorized(
                "you are not invited to buy this asset".into(),
            ));
        }
        self.escrow
            .verify_funds(caller, item.price, item.currency)
            .await?;

        // act
        self.escrow
            .lock_funds(caller, item.price, item.currency)
            .await?;
        let split = self
            .escrow
            .disburse(item.offeror, item.price, item.currency)
            .await?;
        self.escrow
            .release_asset(item.collection, asset_id, caller)
            .await?;

        // commit
        let offeror = item.offeror;
        self.commit(
            move |state| {
                if let Some(record) = state.private_items.get_mut(&asset_id) {
                    record.owner = Some(caller);
                }
            },
            vec![MarketEvent::MarketItemSold {
                owner: offeror,
                buyer: caller,
                asset_id,
            }],
        );
        info!(asset = %asset_id, buyer = %caller, fee = split.fee, "private sale settled");
        Ok(())
    }

    /// Every asset ever listed privately whose live registry ownership
    /// is the caller. Same registry-truth semantics as `fetch_my_nfts`.
    pub async fn fetch_my_private_nfts(
        &self,
        caller: AccountId,
    ) -> MarketResult<Vec<PrivateMarketItem>> {
        let candidates: Vec<PrivateMarketItem> =
            self.state.read().private_items.values().cloned().collect();

        let mut owned = Vec::new();
        for item in candidates {
            let owner = self
                .escrow
                .registry()
                .owner_of(item.collection, item.asset_id)
                .await?;
            if owner == caller {
                owned.push(item);
            }
        }
        Ok(owned)
    }

    /// Active private listings the caller is invited to buy.
    pub fn fetch_my_private_market_items(&self, caller: AccountId) -> Vec<PrivateMarketItem> {
        self.state
            .read()
            .private_items
            .values()
            .filter(|item| item.is_active() && item.invited_buyer == caller)
            .cloned()
            .collect()
    }
}
