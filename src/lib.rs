pub mod config;
pub mod error;
pub mod escrow;
pub mod events;
pub mod fees;
pub mod marketplace;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use config::MarketConfig;
pub use error::{MarketError, MarketResult};
pub use escrow::EscrowCoordinator;
pub use events::{EventBus, MarketEvent};
pub use fees::{split_fee, FeeSplit, BPS_DENOMINATOR};
pub use marketplace::{Market, MarketItem, MarketState, PrivateMarketItem, Registration};
pub use traits::{AssetRegistry, FungibleLedger, SystemTimeProvider, TimeProvider};
pub use types::{AccountId, Amount, AssetId, CollectionId, CurrencyId};
