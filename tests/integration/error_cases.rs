//! Failure injection and conservation tests: no operation may leave
//! partially applied state behind.

use asset_market::mocks::MockLedgerFailure;
use asset_market::MarketError;

use crate::common::{MarketHarness, COLLECTION, CURRENCY, ONE};

const DEADLINE: u64 = 1_000 + 300;

#[tokio::test]
async fn failed_pull_leaves_sale_untouched() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let buyer = harness.onboard(2, 10 * ONE);
    let asset = harness.mint_asset(42, seller);
    harness.list_direct(asset, ONE, seller).await;

    harness.ledger.set_fail_mode(Some(MockLedgerFailure::Pulls));
    let result = harness.market.create_market_sale(asset, buyer).await;
    assert!(result.is_err());

    // Listing still active, asset in escrow, everyone's balance intact.
    assert!(harness.market.get_market_item(asset).unwrap().is_active());
    assert_eq!(harness.owner_of(asset), Some(harness.custody));
    assert_eq!(harness.balance(buyer), 10 * ONE);
    assert_eq!(harness.balance(seller), 0);

    // Clearing the fault lets the same call go through.
    harness.ledger.set_fail_mode(None);
    harness.market.create_market_sale(asset, buyer).await.unwrap();
    assert_eq!(harness.owner_of(asset), Some(buyer));
}

#[tokio::test]
async fn failed_first_bid_leaves_auction_untouched() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let bidder = harness.onboard(2, 10 * ONE);
    let asset = harness.mint_asset(42, seller);
    harness
        .list_auction(asset, ONE, ONE / 10, DEADLINE, seller)
        .await;

    harness.ledger.set_fail_mode(Some(MockLedgerFailure::Pulls));
    let result = harness.market.bid(asset, ONE / 5, bidder).await;
    assert!(result.is_err());

    let item = harness.market.get_market_item(asset).unwrap();
    assert_eq!(item.current_bidder, None);
    assert_eq!(item.locked_bid, 0);
    assert_eq!(harness.balance(bidder), 10 * ONE);
}

#[tokio::test]
async fn failed_refund_leaves_bid_locked() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let bidder = harness.onboard(2, 10 * ONE);
    let asset = harness.mint_asset(42, seller);
    harness
        .list_auction(asset, ONE, ONE / 10, DEADLINE, seller)
        .await;
    harness.market.bid(asset, ONE / 5, bidder).await.unwrap();

    harness.ledger.set_fail_mode(Some(MockLedgerFailure::Pushes));
    let result = harness.market.revoke_bid(asset, bidder).await;
    assert!(result.is_err());

    // The bid is still locked and still refundable once the fault clears.
    let item = harness.market.get_market_item(asset).unwrap();
    assert_eq!(item.current_bidder, Some(bidder));
    assert_eq!(item.locked_bid, ONE / 5);

    harness.ledger.set_fail_mode(None);
    harness.market.revoke_bid(asset, bidder).await.unwrap();
    assert_eq!(harness.balance(bidder), 10 * ONE);
}

#[tokio::test]
async fn unapproved_payer_fails_with_not_approved() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let asset = harness.mint_asset(42, seller);
    harness.list_direct(asset, ONE, seller).await;

    // Funded but never granted the market an allowance.
    let buyer = asset_market::mocks::make_test_account(9);
    harness.ledger.mint(buyer, CURRENCY, 10 * ONE);

    let result = harness.market.create_market_sale(asset, buyer).await;
    assert!(matches!(result, Err(MarketError::NotApproved(_))));
    assert!(harness.market.get_market_item(asset).unwrap().is_active());
}

#[tokio::test]
async fn unapproved_replacement_bidder_leaves_escrow_intact() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let bidder = harness.onboard(2, 10 * ONE);
    let asset = harness.mint_asset(42, seller);
    harness
        .list_auction(asset, ONE, ONE / 10, DEADLINE, seller)
        .await;
    harness.market.bid(asset, 2 * ONE / 10, bidder).await.unwrap();

    // A higher bid from a funded account that never granted the market
    // an allowance must fail before the standing bid is touched.
    let unapproved = asset_market::mocks::make_test_account(9);
    harness.ledger.mint(unapproved, CURRENCY, 10 * ONE);

    let result = harness.market.bid(asset, 4 * ONE / 10, unapproved).await;
    assert!(matches!(result, Err(MarketError::NotApproved(_))));

    // Custody still holds the displaced bid and the record is unchanged.
    assert_eq!(harness.balance(harness.custody), 2 * ONE / 10);
    let item = harness.market.get_market_item(asset).unwrap();
    assert_eq!(item.current_bidder, Some(bidder));
    assert_eq!(item.locked_bid, 2 * ONE / 10);

    // The standing bidder can still exit cleanly.
    harness.market.revoke_bid(asset, bidder).await.unwrap();
    assert_eq!(harness.balance(bidder), 10 * ONE);
    assert_eq!(harness.balance(harness.custody), 0);
}

#[tokio::test]
async fn value_is_conserved_across_a_full_auction() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 5 * ONE);
    let bidder_a = harness.onboard(2, 10 * ONE);
    let bidder_b = harness.onboard(3, 10 * ONE);
    let asset = harness.mint_asset(42, seller);

    let supply_before = harness.ledger.total_supply(CURRENCY);

    harness
        .list_auction(asset, ONE, ONE / 10, DEADLINE, seller)
        .await;
    harness.market.bid(asset, 2 * ONE / 10, bidder_a).await.unwrap();
    harness.market.bid(asset, 4 * ONE / 10, bidder_b).await.unwrap();
    harness
        .market
        .bid_increase(asset, ONE / 10, bidder_b)
        .await
        .unwrap();
    harness.time.set(DEADLINE + 60);
    harness.market.close_auction(asset, seller).await.unwrap();

    // Fees and payouts only move value around, never create or burn it.
    assert_eq!(harness.ledger.total_supply(CURRENCY), supply_before);
    assert_eq!(harness.balance(harness.custody), 0);
}

#[tokio::test]
async fn operations_on_disjoint_assets_do_not_interfere() {
    let harness = MarketHarness::new();
    let seller = harness.onboard(1, 0);
    let buyer = harness.onboard(2, 10 * ONE);
    let bidder = harness.onboard(3, 10 * ONE);
    let asset_a = harness.mint_asset(1, seller);
    let asset_b = harness.mint_asset(2, seller);

    harness.list_direct(asset_a, ONE, seller).await;
    harness
        .list_auction(asset_b, ONE, ONE / 10, DEADLINE, seller)
        .await;

    let market = &harness.market;
    let (sale, bid) = tokio::join!(
        market.create_market_sale(asset_a, buyer),
        market.bid(asset_b, ONE / 5, bidder),
    );
    sale.unwrap();
    bid.unwrap();

    assert_eq!(harness.owner_of(asset_a), Some(buyer));
    assert_eq!(
        market.get_market_item(asset_b).unwrap().current_bidder,
        Some(bidder)
    );
}

#[tokio::test]
async fn remove_of_unlisted_asset_is_not_found() {
    let harness = MarketHarness::new();
    let caller = harness.onboard(1, 0);

    let result = harness
        .market
        .remove_market_item(asset_market::AssetId(9999), COLLECTION, caller)
        .await;
    assert!(matches!(result, Err(MarketError::NotFound(_))));
}
