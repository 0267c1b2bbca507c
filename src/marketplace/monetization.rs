//! Creator monetization: timed registrations and one-off tips.
//!
//! Independent of asset listings, but settles through the same escrow
//! coordinator and fee split. Registrations are append-only and expire
//! lazily; there is no background sweep.

use tracing::info;

use crate::error::{MarketError, MarketResult};
use crate::events::MarketEvent;
use crate::marketplace::item::Registration;
use crate::marketplace::Market;
use crate::traits::{AssetRegistry, FungibleLedger, TimeProvider};
use crate::types::{AccountId, Amount, CurrencyId};

impl<R, L, T> Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    /// Subscribe to a creator until `expiry`. The price is pulled from
    /// the caller; the creator receives it minus the operator fee.
    pub async fn register(
        &self,
        price: Amount,
        creator: AccountId,
        expiry: u64,
        currency: CurrencyId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_monetization().await;

        // check
        if price == 0 {
            return Err(MarketError::InvalidParameter(
                "price must be greater than 0".into(),
            ));
        }
        if expiry <= self.time.now_unix() {
            return Err(MarketError::InvalidParameter(
                "registration must have a valid end date".into(),
            ));
        }
        self.escrow.verify_funds(caller, price, currency).await?;

        // act
        self.escrow.lock_funds(caller, price, currency).await?;
        let split = self.escrow.disburse(creator, price, currency).await?;

        // commit
        let registration = Registration {
            owner: caller,
            creator,
            price,
            currency,
            expiry,
        };
        self.commit(
            move |state| {
                state.registrations.push(registration);
            },
            vec![MarketEvent::Registered {
                owner: caller,
                price,
                creator,
                currency,
            }],
        );
        info!(owner = %caller, creator = %creator, price, fee = split.fee, "registration created");
        Ok(())
    }

    /// One-off tip to a creator, fee-split like every other transfer.
    pub async fn tip(
        &self,
        amount: Amount,
        creator: AccountId,
        currency: CurrencyId,
        caller: AccountId,
    ) -> MarketResult<()> {
        let _guard = self.lock_monetization().await;

        // check
        if amount == 0 {
            return Err(MarketError::InvalidParameter(
                "tip amount must be greater than 0".into(),
            ));
        }
        self.escrow.verify_funds(caller, amount, currency).await?;

        // act
        self.escrow.lock_funds(caller, amount, currency).await?;
        let split = self.escrow.disburse(creator, amount, currency).await?;

        // commit: tips leave no record, only the event
        self.commit(
            |_state| {},
            vec![MarketEvent::Tiped {
                donator: caller,
                amount,
                creator,
                currency,
            }],
        );
        info!(donator = %caller, creator = %creator, amount, fee = split.fee, "tip settled");
        Ok(())
    }

    /// Registrations owned by the caller that have not lapsed yet.
    /// Expired records stay stored, they just drop out of this view.
    pub fn fetch_my_registrations(&self, caller: AccountId) -> Vec<Registration> {
        let now = self.time.now_unix();
        self.state
            .read()
            .registrations
            .iter()
            .filter(|reg| reg.owner == caller && reg.is_live_at(now))
            .cloned()
            .collect()
    }
}
