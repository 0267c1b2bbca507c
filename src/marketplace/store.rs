//! Public listing lifecycle: create, query, remove, direct sale.

use tracing::info;

use crate::config::MIN_AUCTION_OFFER;
use crate::error::{MarketError, MarketResult};
use crate::events::MarketEvent;
use crate::marketplace::item::MarketItem;
use crate::marketplace::Market;
use crate::traits::{AssetRegistry, FungibleLedger, TimeProvider};
use crate::types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};

impl<R, L, T> Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    /// List an asset for direct sale or auction.
    ///
    /// The caller must own the asset on the registry; the asset moves
    /// into market custody as part of the same unit. Auctions require a
    /// reserve of at least one smallest currency unit and a deadline
    /// strictly in the future.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_market_item(
        &self,
        collection: CollectionId,
        asset_id: AssetId,
        price: Amount,
        currency: CurrencyId,
        is_auction: bool,
        minimum_offer: Amount,
        auction_deadline: u64,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        if is_auction {
            if minimum_offer < MIN_AUCTION_OFFER {
                return Err(MarketError::InvalidParameter(
                    "minimum offer must be at least 1 smallest currency unit".into(),
                ));
            }
            if auction_deadline <= self.time.now_unix() {
                return Err(MarketError::InvalidParameter(
                    "auction deadline must be strictly in the future".into(),
                ));
            }
        } else if minimum_offer != 0 || auction_deadline != 0 {
            return Err(MarketError::InvalidParameter(
                "direct sale cannot carry auction parameters".into(),
            ));
        }
        if self.state.read().has_active_listing(asset_id) {
            return Err(MarketError::Conflict(format!(
                "an active listing already exists for asset {asset_id}"
            )));
        }
        self.escrow.verify_owner(collection, asset_id, caller).await?;

        // act
        self.escrow.take_asset(collection, asset_id, caller).await?;

        // commit
        let item = MarketItem {
            collection,
            asset_id,
            price,
            currency,
            is_auction,
            offeror: caller,
            owner: None,
            minimum_offer,
            auction_deadline,
            current_bidder: None,
            locked_bid: 0,
        };
        let mut events = vec![MarketEvent::MarketItemCreated {
            collection,
            asset_id,
            offeror: caller,
            owner: None,
            price,
            currency,
            is_auction,
            minimum_offer,
            auction_deadline,
        }];
        if is_auction {
            events.push(MarketEvent::OfferUpdated {
                asset_id,
                offeror: Some(caller),
                minimum_offer,
                invited_bidder: None,
            });
        }
        self.commit(
            move |state| {
                state.items.insert(asset_id, item);
            },
            events,
        );
        info!(asset = %asset_id, offeror = %caller, is_auction, "market item created");
        Ok(())
    }

    /// Look up a listing record, active or historical.
    pub fn get_market_item(&self, asset_id: AssetId) -> MarketResult<MarketItem> {
        self.state
            .read()
            .items
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound("asset id not found in the market".into()))
    }

    /// Take an active listing off the market and return the asset to the
    /// offeror. An auction with a locked bid must be cleared first.
    pub async fn remove_market_item(
        &self,
        asset_id: AssetId,
        collection: CollectionId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.get_market_item(asset_id)?;
        if !item.is_active() {
            return Err(MarketError::Conflict(format!(
                "listing for asset {asset_id} is no longer active"
            )));
        }
        if item.offeror != caller {
            return Err(MarketError::Unauthorized(
                "you are not the offeror of this asset".into(),
            ));
        }
        if item.is_auction && item.has_bid() {
            return Err(MarketError::Conflict(
                "an auction on this asset has an active bid, cancel the auction first".into(),
            ));
        }

        // act
        self.escrow
            .release_asset(collection, asset_id, item.offeror)
            .await?;

        // commit: record stays, owned again by the offeror
        let offeror = item.offeror;
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.owner = Some(offeror);
                }
            },
            vec![MarketEvent::MarketItemRemoved {
                collection,
                asset_id,
            }],
        );
        info!(asset = %asset_id, "market item removed");
        Ok(())
    }

    /// Buy a direct-sale listing at its asking price.
    ///
    /// Pulls the price from the caller, pays fee and remainder out, and
    /// hands the asset over, all as one unit.
    pub async fn create_market_sale(
        &self,
        asset_id: AssetId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.get_market_item(asset_id)?;
        if !item.is_active() {
            return Err(MarketError::Conflict(format!(
                "listing for asset {asset_id} is no longer active"
            )));
        }
        if item.is_auction {
            return Err(MarketError::Conflict(
                "this asset is auctioned, it cannot be bought directly".into(),
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
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.owner = Some(caller);
                }
            },
            vec![MarketEvent::MarketItemSold {
                owner: offeror,
                buyer: caller,
                asset_id,
            }],
        );
        info!(asset = %asset_id, buyer = %caller, fee = split.fee, "market sale settled");
        Ok(())
    }

    /// All active public listings.
    pub fn fetch_market_items(&self) -> Vec<MarketItem> {
        self.state
            .read()
            .items
            .values()
            .filter(|item| item.is_active())
            .cloned()
            .collect()
    }

    /// Active public listings the caller has put up.
    pub fn fetch_my_listed_nfts(&self, caller: AccountId) -> Vec<MarketItem> {
        self.state
            .read()
            .items
            .values()
            .filter(|item| item.is_active() && item.offeror == caller)
            .cloned()
            .collect()
    }

    /// Every asset the market has ever listed whose *live* registry
    /// ownership is the caller.
    ///
    /// Ownership comes from the registry, not local bookkeeping; assets
    /// that changed hands outside the market are reflected too. Full
    /// scan over the retained records.
    pub async fn fetch_my_nfts(&self, caller: AccountId) -> MarketResult<Vec<MarketItem>> {
        let candidates: Vec<MarketItem> =
            self.state.read().items.values().cloned().collect();

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
}
