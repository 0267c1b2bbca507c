//! Auction engine: bid, raise, revoke, cancel, close.
//!
//! Operates on the auction fields of an active listing. All deadline
//! checks are lazy, evaluated against the injected clock at call time.

use tracing::info;

use crate::error::{MarketError, MarketResult};
use crate::events::MarketEvent;
use crate::marketplace::item::MarketItem;
use crate::marketplace::Market;
use crate::traits::{AssetRegistry, FungibleLedger, TimeProvider};
use crate::types::{AccountId, Amount, AssetId};

impl<R, L, T> Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    fn active_auction(&self, asset_id: AssetId) -> MarketResult<MarketItem> {
        let item = self.get_market_item(asset_id)?;
        if !item.is_active() {
            return Err(MarketError::Conflict(format!(
                "listing for asset {asset_id} is no longer active"
            )));
        }
        if !item.is_auction {
            return Err(MarketError::Conflict(
                "this asset is not auctionable".into(),
            ));
        }
        Ok(item)
    }

    /// Place a bid, replacing and fully refunding the previous highest
    /// bidder. The first bid must beat the reserve; later bids must beat
    /// the locked bid, strictly.
    pub async fn bid(
        &self,
        asset_id: AssetId,
        amount: Amount,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.active_auction(asset_id)?;
        if !item.auction_open_at(self.time.now_unix()) {
            return Err(MarketError::DeadlinePassed(
                "auction period is over for this asset".into(),
            ));
        }
        match item.current_bidder {
            None => {
                if amount <= item.minimum_offer {
                    return Err(MarketError::BidTooLow(format!(
                        "bid {amount} does not beat the minimum offer {}",
                        item.minimum_offer
                    )));
                }
            }
            Some(_) => {
                if amount <= item.locked_bid {
                    return Err(MarketError::BidTooLow(format!(
                        "bid {amount} does not beat the highest bid {}",
                        item.locked_bid
                    )));
                }
            }
        }
        self.escrow
            .verify_funds(caller, amount, item.currency)
            .await?;

        // act: refund the displaced bidder before locking the new bid
        if let Some(previous) = item.current_bidder {
            self.escrow
                .refund(previous, item.locked_bid, item.currency)
                .await?;
        }
        self.escrow
            .lock_funds(caller, amount, item.currency)
            .await?;

        // commit
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.current_bidder = Some(caller);
                    record.locked_bid = amount;
                }
            },
            vec![MarketEvent::BidUpdated {
                asset_id,
                bidder: Some(caller),
                locked_bid: amount,
            }],
        );
        info!(asset = %asset_id, bidder = %caller, amount, "bid accepted");
        Ok(())
    }

    /// Raise the caller's own highest bid by `increment`.
    pub async fn bid_increase(
        &self,
        asset_id: AssetId,
        increment: Amount,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.active_auction(asset_id)?;
        if item.current_bidder != Some(caller) {
            return Err(MarketError::Unauthorized(
                "you are not the current bidder".into(),
            ));
        }
        if increment == 0 {
            return Err(MarketError::InvalidParameter(
                "must send value to increase a bid".into(),
            ));
        }
        if !item.auction_open_at(self.time.now_unix()) {
            return Err(MarketError::DeadlinePassed(
                "auction period is over for this asset".into(),
            ));
        }
        let Some(total) = item.locked_bid.checked_add(increment) else {
            return Err(MarketError::InvalidParameter(
                "raised bid exceeds the representable amount".into(),
            ));
        };
        self.escrow
            .verify_funds(caller, increment, item.currency)
            .await?;

        // act
        self.escrow
            .lock_funds(caller, increment, item.currency)
            .await?;

        // commit
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.locked_bid = total;
                }
            },
            vec![MarketEvent::BidUpdated {
                asset_id,
                bidder: Some(caller),
                locked_bid: total,
            }],
        );
        info!(asset = %asset_id, bidder = %caller, total, "bid increased");
        Ok(())
    }

    /// Withdraw the caller's bid while the auction is still open,
    /// refunding the full locked amount.
    pub async fn revoke_bid(&self, asset_id: AssetId, caller: AccountId) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.active_auction(asset_id)?;
        if item.current_bidder != Some(caller) {
            return Err(MarketError::Unauthorized(
                "only the bidder may revoke their bid".into(),
            ));
        }
        if !item.auction_open_at(self.time.now_unix()) {
            return Err(MarketError::DeadlinePassed(
                "auction period is over for this asset".into(),
            ));
        }

        // act
        self.escrow
            .refund(caller, item.locked_bid, item.currency)
            .await?;

        // commit
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.current_bidder = None;
                    record.locked_bid = 0;
                }
            },
            vec![MarketEvent::BidUpdated {
                asset_id,
                bidder: None,
                locked_bid: 0,
            }],
        );
        info!(asset = %asset_id, bidder = %caller, "bid revoked");
        Ok(())
    }

    /// Cancel a still-running auction: refund any active bid and return
    /// the asset to the offeror.
    pub async fn cancel_auction(&self, asset_id: AssetId, caller: AccountId) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.active_auction(asset_id)?;
        if item.offeror != caller {
            return Err(MarketError::Unauthorized(
                "only the offeror may cancel this auction".into(),
            ));
        }
        if !item.auction_open_at(self.time.now_unix()) {
            return Err(MarketError::DeadlinePassed(
                "auction already over, cannot cancel".into(),
            ));
        }

        // act
        if let Some(bidder) = item.current_bidder {
            self.escrow
                .refund(bidder, item.locked_bid, item.currency)
                .await?;
        }
        self.escrow
            .release_asset(item.collection, asset_id, item.offeror)
            .await?;

        // commit
        let offeror = item.offeror;
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.owner = Some(offeror);
                    record.current_bidder = None;
                    record.locked_bid = 0;
                }
            },
            vec![MarketEvent::OfferUpdated {
                asset_id,
                offeror: None,
                minimum_offer: 0,
                invited_bidder: None,
            }],
        );
        info!(asset = %asset_id, "auction cancelled");
        Ok(())
    }

    /// Settle an auction after its deadline: pay the offeror out of the
    /// locked bid (minus the operator fee) and hand the asset to the
    /// winning bidder.
    pub async fn close_auction(&self, asset_id: AssetId, caller: AccountId) -> MarketResult<()> {
        let _guard = self.lock_asset(asset_id).await;

        // check
        let item = self.active_auction(asset_id)?;
        if item.offeror != caller {
            return Err(MarketError::Unauthorized(
                "only the offeror may close this auction".into(),
            ));
        }
        if item.auction_open_at(self.time.now_unix()) {
            return Err(MarketError::Conflict("auction is still running".into()));
        }
        let Some(bidder) = item.current_bidder else {
            return Err(MarketError::Conflict("this auction has no bid".into()));
        };

        // act: funds are already in escrow, pay them out and release the asset
        let value = item.locked_bid;
        let split = self
            .escrow
            .disburse(item.offeror, value, item.currency)
            .await?;
        self.escrow
            .release_asset(item.collection, asset_id, bidder)
            .await?;

        // commit
        let offeror = item.offeror;
        self.commit(
            move |state| {
                if let Some(record) = state.items.get_mut(&asset_id) {
                    record.owner = Some(bidder);
                    record.current_bidder = None;
                    record.locked_bid = 0;
                }
            },
            vec![
                MarketEvent::Traded {
                    asset_id,
                    value,
                    offeror,
                    bidder,
                },
                MarketEvent::BidUpdated {
                    asset_id,
                    bidder: None,
                    locked_bid: 0,
                },
                MarketEvent::MarketItemSold {
                    owner: offeror,
                    buyer: bidder,
                    asset_id,
                },
            ],
        );
        info!(asset = %asset_id, winner = %bidder, value, fee = split.fee, "auction closed");
        Ok(())
    }
}
