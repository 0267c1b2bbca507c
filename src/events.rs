//! Domain events emitted by the market.
//!
//! Events form an ordered, append-only notification stream: every commit
//! appends to an in-process log and broadcasts to live subscribers in
//! emission order. External indexers consume them; the core never reads
//! them back.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    MarketItemCreated {
        collection: CollectionId,
        asset_id: AssetId,
        offeror: AccountId,
        owner: Option<AccountId>,
        price: Amount,
        currency: CurrencyId,
        is_auction: bool,
        minimum_offer: Amount,
        auction_deadline: u64,
    },
    OfferUpdated {
        asset_id: AssetId,
        offeror: Option<AccountId>,
        minimum_offer: Amount,
        invited_bidder: Option<AccountId>,
    },
    BidUpdated {
        asset_id: AssetId,
        bidder: Option<AccountId>,
        locked_bid: Amount,
    },
    MarketItemRemoved {
        collection: CollectionId,
        asset_id: AssetId,
    },
    MarketItemSold {
        owner: AccountId,
        buyer: AccountId,
        asset_id: AssetId,
    },
    Traded {
        asset_id: AssetId,
        value: Amount,
        offeror: AccountId,
        bidder: AccountId,
    },
    Registered {
        owner: AccountId,
        price: Amount,
        creator: AccountId,
        currency: CurrencyId,
    },
    /// Historical name, kept for consumers keyed on it.
    Tiped {
        donator: AccountId,
        amount: Amount,
        creator: AccountId,
        currency: CurrencyId,
    },
}

/// Ordered event log plus live broadcast channel.
pub struct EventBus {
    log: Mutex<Vec<MarketEvent>>,
    tx: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            log: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Append an event and fan it out to subscribers.
    pub fn emit(&self, event: MarketEvent) {
        self.log.lock().push(event.clone());
        // A send error only means there are no live subscribers.
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.tx.subscribe()
    }

    /// Snapshot of every event emitted so far, in order.
    pub fn log(&self) -> Vec<MarketEvent> {
        self.log.lock().clone()
    }

    /// Number of events emitted so far.
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
