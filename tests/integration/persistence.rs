//! Snapshot persistence tests: state committed by one market instance
//! is visible to the next one opened on the same path.

use asset_market::mocks::make_test_account;
use asset_market::MarketEvent;

use crate::common::{MarketHarness, CURRENCY, ONE};

#[tokio::test]
async fn committed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.cbor");

    let seller;
    let buyer;
    let asset;
    {
        let harness = MarketHarness::with_snapshot(&path);
        seller = harness.onboard(1, 0);
        buyer = harness.onboard(2, 10 * ONE);
        asset = harness.mint_asset(42, seller);

        harness.list_direct(asset, ONE, seller).await;
        harness.market.create_market_sale(asset, buyer).await.unwrap();

        let creator = make_test_account(50);
        harness
            .market
            .register(ONE / 2, creator, harness.time.get() + 300, CURRENCY, buyer)
            .await
            .unwrap();
    }

    // A fresh instance on the same path sees the committed history.
    let reopened = MarketHarness::with_snapshot(&path);
    let item = reopened.market.get_market_item(asset).unwrap();
    assert_eq!(item.owner, Some(buyer));
    assert_eq!(item.offeror, seller);
    assert!(reopened.market.fetch_market_items().is_empty());
    assert_eq!(reopened.market.fetch_my_registrations(buyer).len(), 1);
}

#[tokio::test]
async fn snapshot_tracks_every_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.cbor");

    let harness = MarketHarness::with_snapshot(&path);
    let seller = harness.onboard(1, 0);
    let asset = harness.mint_asset(42, seller);

    harness.list_direct(asset, ONE, seller).await;
    assert!(path.exists());

    harness
        .market
        .remove_market_item(asset, crate::common::COLLECTION, seller)
        .await
        .unwrap();

    let reopened = MarketHarness::with_snapshot(&path);
    assert!(!reopened.market.get_market_item(asset).unwrap().is_active());
}

#[tokio::test]
async fn events_are_not_persisted_only_state_is() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.cbor");

    {
        let harness = MarketHarness::with_snapshot(&path);
        let seller = harness.onboard(1, 0);
        let asset = harness.mint_asset(42, seller);
        harness.list_direct(asset, ONE, seller).await;
        assert!(matches!(
            harness.events()[..],
            [MarketEvent::MarketItemCreated { .. }]
        ));
    }

    // The notification stream starts fresh per instance.
    let reopened = MarketHarness::with_snapshot(&path);
    assert!(reopened.events().is_empty());
}
