use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};

/// A public listing: direct sale or ascending auction.
///
/// Records are retained after every terminal transition. A listing is
/// *active* while `owner` is unset; a sale, removal or auction close
/// populates `owner` and drops the record out of the active views while
/// keeping it queryable for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    /// Collection the asset belongs to.
    pub collection: CollectionId,

    /// Asset being sold. Unique among active listings.
    pub asset_id: AssetId,

    /// Direct-sale price in smallest currency units.
    pub price: Amount,

    /// Currency the listing settles in.
    pub currency: CurrencyId,

    /// Whether this listing runs as an ascending auction.
    pub is_auction: bool,

    /// Account that listed the asset.
    pub offeror: AccountId,

    /// Unset while listed; the buyer once sold, the offeror once
    /// removed or cancelled.
    pub owner: Option<AccountId>,

    /// Auction reserve. Zero for direct sales.
    pub minimum_offer: Amount,

    /// Unix timestamp the auction closes at. Zero for direct sales.
    pub auction_deadline: u64,

    /// Highest bidder, if any bid is locked.
    pub current_bidder: Option<AccountId>,

    /// Funds held in escrow for the highest bid.
    pub locked_bid: Amount,
}

impl MarketItem {
    /// Whether the record is still an active listing.
    pub const fn is_active(&self) -> bool {
        self.owner.is_none()
    }

    /// Whether the auction window is still open at `now`.
    pub const fn auction_open_at(&self, now: u64) -> bool {
        now < self.auction_deadline
    }

    /// Whether a bid is currently locked on this listing.
    pub const fn has_bid(&self) -> bool {
        self.locked_bid > 0
    }
}

/// An invite-only listing: same shape as [`MarketItem`] minus the
/// auction fields, plus the single account allowed to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMarketItem {
    pub collection: CollectionId,
    pub asset_id: AssetId,
    pub price: Amount,
    pub currency: CurrencyId,
    pub offeror: AccountId,
    pub owner: Option<AccountId>,

    /// The sole account authorized to purchase.
    pub invited_buyer: AccountId,
}

impl PrivateMarketItem {
    pub const fn is_active(&self) -> bool {
        self.owner.is_none()
    }
}

/// A timed subscription to a creator.
///
/// Append-only: registrations are never mutated or deleted, they simply
/// age out of the active views past `expiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub owner: AccountId,
    pub creator: AccountId,
    pub price: Amount,
    pub currency: CurrencyId,

    /// Unix timestamp the registration lapses at.
    pub expiry: u64,
}

impl Registration {
    /// Whether the registration is still live at `now` (lazy expiry).
    pub const fn is_live_at(&self, now: u64) -> bool {
        self.expiry > now
    }
}
