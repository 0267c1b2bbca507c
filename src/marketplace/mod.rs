//! The marketplace core: listings, auctions, private sales and creator
//! monetization over one shared state object.
//!
//! [`Market`] is the single entry point. Every mutating operation runs
//! as one indivisible unit in three phases:
//!
//! 1. **check** — validate all preconditions against the current state
//!    and pre-verify external balances/ownership, with no side effects;
//! 2. **act** — perform the external escrow and fund movements; any
//!    failure here aborts with zero local mutation;
//! 3. **commit** — apply the in-memory mutation, emit the domain events
//!    in order, and flush the snapshot.
//!
//! A per-asset-id lock is held across all three phases, so concurrent
//! operations on the same asset serialize while disjoint assets proceed
//! independently.

pub mod auction;
pub mod item;
pub mod monetization;
pub mod private_sale;
pub mod state;
pub mod store;

pub use item::{MarketItem, PrivateMarketItem, Registration};
pub use state::MarketState;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use crate::config::MarketConfig;
use crate::error::MarketResult;
use crate::escrow::EscrowCoordinator;
use crate::events::{EventBus, MarketEvent};
use crate::traits::{AssetRegistry, FungibleLedger, TimeProvider};
use crate::types::AssetId;

/// Per-asset-id mutual exclusion for mutating operations.
struct AssetLocks {
    inner: Mutex<HashMap<AssetId, Arc<AsyncMutex<()>>>>,
}

impl AssetLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for one asset id, creating it on first use.
    async fn acquire(&self, asset_id: AssetId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            Arc::clone(map.entry(asset_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// The marketplace engine, generic over its external collaborators.
pub struct Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    pub(crate) config: MarketConfig,
    pub(crate) escrow: EscrowCoordinator<R, L>,
    pub(crate) time: T,
    pub(crate) events: EventBus,
    pub(crate) state: RwLock<MarketState>,
    locks: AssetLocks,
    /// Serializes monetization appends, which have no asset id to key on.
    monetization_lock: AsyncMutex<()>,
    snapshot_path: Option<PathBuf>,
}

impl<R, L, T> Market<R, L, T>
where
    R: AssetRegistry,
    L: FungibleLedger,
    T: TimeProvider,
{
    /// Create a market with empty state and no persistence.
    pub fn new(registry: R, ledger: L, time: T, config: MarketConfig) -> Self {
        Self::with_state(registry, ledger, time, config, MarketState::default(), None)
    }

    /// Open a market backed by a snapshot file: state is loaded from
    /// `path` (empty if absent) and flushed back after every commit.
    pub fn open(
        registry: R,
        ledger: L,
        time: T,
        config: MarketConfig,
        path: impl AsRef<Path>,
    ) -> MarketResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = MarketState::load(&path)?;
        Ok(Self::with_state(
            registry,
            ledger,
            time,
            config,
            state,
            Some(path),
        ))
    }

    fn with_state(
        registry: R,
        ledger: L,
        time: T,
        config: MarketConfig,
        state: MarketState,
        snapshot_path: Option<PathBuf>,
    ) -> Self {
        Self {
            escrow: EscrowCoordinator::new(registry, ledger, config),
            config,
            time,
            events: EventBus::new(),
            state: RwLock::new(state),
            locks: AssetLocks::new(),
            monetization_lock: AsyncMutex::new(()),
            snapshot_path,
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &R {
        self.escrow.registry()
    }

    pub fn ledger(&self) -> &L {
        self.escrow.ledger()
    }

    pub(crate) async fn lock_asset(&self, asset_id: AssetId) -> OwnedMutexGuard<()> {
        self.locks.acquire(asset_id).await
    }

    pub(crate) async fn lock_monetization(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.monetization_lock.lock().await
    }

    /// Commit phase: apply the mutation, emit events in order, flush.
    ///
    /// Never fails. A failed snapshot flush leaves the committed state
    /// live in memory and is retried on the next commit.
    pub(crate) fn commit<F>(&self, mutate: F, events: Vec<MarketEvent>)
    where
        F: FnOnce(&mut MarketState),
    {
        {
            let mut state = self.state.write();
            mutate(&mut state);
        }
        for event in events {
            self.events.emit(event);
        }
        if let Some(path) = &self.snapshot_path {
            if let Err(e) = self.state.read().flush(path) {
                warn!(path = %path.display(), error = %e, "snapshot flush failed, state remains in memory");
            }
        }
    }
}
