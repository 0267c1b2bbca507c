//! Mock collaborators for testing.
//!
//! In-memory, deterministic stand-ins for the external asset registry,
//! fungible ledger and clock. Compiled for the crate's own tests and,
//! behind the `test-support` feature, for downstream test suites.

pub mod ledger;
pub mod registry;
pub mod time;

pub use ledger::{MockLedger, MockLedgerFailure};
pub use registry::MockAssetRegistry;
pub use time::MockTime;

use crate::types::AccountId;

/// Create a deterministic test account id.
pub fn make_test_account(id: u8) -> AccountId {
    let mut bytes = [id; 32];
    // Offset a couple of bytes so neighbouring ids never collide.
    bytes[0] = id;
    bytes[1] = id.wrapping_add(1);
    AccountId::from_bytes(bytes)
}
