//! Trait abstractions for the market's external collaborators.
//!
//! The asset registry, fungible ledger and clock are all supplied from
//! outside the core. Abstracting them behind traits keeps every operation
//! testable with deterministic in-memory implementations.

pub mod ledger;
pub mod registry;
pub mod time;

pub use ledger::FungibleLedger;
pub use registry::AssetRegistry;
pub use time::TimeProvider;

// Re-export default implementations
pub use time::SystemTimeProvider;
