use std::sync::Arc;
use std::time::Duration;

use cart::{CartError, CartService, Money, PricingConfig, Product, StaticSession};
use checkout::{CheckoutError, CheckoutService, CheckoutStep, SimulatedGateway};
use doc_store::InMemoryDocumentStore;

type TestCheckout =
    CheckoutService<Arc<InMemoryDocumentStore>, StaticSession, SimulatedGateway>;

fn build_checkout(session: StaticSession, gateway: SimulatedGateway) -> TestCheckout {
    let store = Arc::new(InMemoryDocumentStore::new());
    let cart = CartService::new(store, session, PricingConfig::default());
    CheckoutService::new(cart, gateway)
}

fn fast_gateway() -> SimulatedGateway {
    SimulatedGateway::with_delay(Duration::from_millis(10))
}

async fn fill_cart(checkout: &TestCheckout) {
    checkout
        .cart()
        .add_item(&Product::new("42", "Widget", Money::from_dollars(10)), None, 2)
        .await
        .unwrap();
    checkout
        .cart()
        .add_item(&Product::new("7", "Gadget", Money::from_dollars(5)), None, 1)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn happy_path_places_the_order() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::signed_in("user-1"), gateway.clone());
    fill_cart(&checkout).await;

    assert_eq!(checkout.state().await.step, CheckoutStep::Shipping);
    assert_eq!(checkout.advance().await.unwrap().step, CheckoutStep::Payment);

    let state = checkout.advance().await.unwrap();
    assert_eq!(state.step, CheckoutStep::Review);
    let reviewed = state.reviewed.unwrap();
    assert_eq!(reviewed.total, Money::from_cents(3_625));

    let receipt = checkout.place_order().await.unwrap();
    assert_eq!(receipt.summary, reviewed);
    assert_eq!(receipt.payment_id, "PAY-0001");

    assert_eq!(checkout.state().await.step, CheckoutStep::Success);
    assert!(checkout.cart().load().await.unwrap().cart.is_empty());
    assert_eq!(gateway.last_charged_amount(), Some(Money::from_cents(3_625)));
}

#[tokio::test]
async fn place_order_requires_the_review_step() {
    let checkout = build_checkout(StaticSession::signed_in("user-1"), fast_gateway());
    fill_cart(&checkout).await;

    let err = checkout.place_order().await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::InvalidTransition {
            current: CheckoutStep::Shipping,
            ..
        }
    ));

    checkout.advance().await.unwrap();
    let err = checkout.place_order().await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::InvalidTransition {
            current: CheckoutStep::Payment,
            ..
        }
    ));
}

#[tokio::test]
async fn empty_cart_cannot_be_placed_and_state_is_unchanged() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::signed_in("user-1"), gateway.clone());

    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();
    assert_eq!(checkout.state().await.step, CheckoutStep::Review);

    let err = checkout.place_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(checkout.state().await.step, CheckoutStep::Review);
    assert_eq!(gateway.charge_count(), 0);
}

#[tokio::test]
async fn signed_out_place_order_requires_auth() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::anonymous(), gateway.clone());

    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();

    let err = checkout.place_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Cart(CartError::AuthRequired)));
    assert_eq!(gateway.charge_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn declined_settlement_lands_on_failure_and_keeps_the_cart() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::signed_in("user-1"), gateway.clone());
    fill_cart(&checkout).await;

    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();
    gateway.set_decline_next(true);

    let err = checkout.place_order().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Declined(_)));
    assert_eq!(checkout.state().await.step, CheckoutStep::Failure);
    assert_eq!(checkout.cart().load().await.unwrap().cart.item_count(), 2);
    assert_eq!(gateway.charge_count(), 0);
}

#[tokio::test]
async fn concurrent_place_order_charges_exactly_once() {
    let gateway = SimulatedGateway::with_delay(Duration::from_millis(50));
    let checkout = Arc::new(build_checkout(
        StaticSession::signed_in("user-1"),
        gateway.clone(),
    ));
    fill_cart(&checkout).await;

    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();

    let first = tokio::spawn({
        let checkout = checkout.clone();
        async move { checkout.place_order().await }
    });
    let second = tokio::spawn({
        let checkout = checkout.clone();
        async move { checkout.place_order().await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let placed = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(CheckoutError::InvalidTransition { .. })))
        .count();

    assert_eq!(placed, 1);
    assert_eq!(rejected, 1);
    assert_eq!(gateway.charge_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn charged_amount_is_the_review_snapshot() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::signed_in("user-1"), gateway.clone());
    fill_cart(&checkout).await;

    checkout.advance().await.unwrap();
    let reviewed = checkout.advance().await.unwrap().reviewed.unwrap();

    // Cart keeps changing while the buyer sits on the review page.
    checkout
        .cart()
        .add_item(&Product::new("99", "Doodad", Money::from_dollars(100)), None, 1)
        .await
        .unwrap();

    checkout.place_order().await.unwrap();
    assert_eq!(gateway.last_charged_amount(), Some(reviewed.total));
}

#[tokio::test]
async fn going_back_and_returning_recomputes_the_snapshot() {
    let checkout = build_checkout(StaticSession::signed_in("user-1"), fast_gateway());
    fill_cart(&checkout).await;

    checkout.advance().await.unwrap();
    let first = checkout.advance().await.unwrap().reviewed.unwrap();

    checkout.go_back().await.unwrap();
    assert!(checkout.state().await.reviewed.is_none());

    checkout
        .cart()
        .add_item(&Product::new("42", "Widget", Money::from_dollars(10)), None, 1)
        .await
        .unwrap();

    let second = checkout.advance().await.unwrap().reviewed.unwrap();
    assert!(second.total > first.total);
}

#[tokio::test]
async fn store_outage_after_settlement_still_returns_the_receipt() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let gateway = SimulatedGateway::with_delay(Duration::from_millis(50));
    let cart = CartService::new(
        store.clone(),
        StaticSession::signed_in("user-1"),
        PricingConfig::default(),
    );
    let checkout = Arc::new(CheckoutService::new(cart, gateway.clone()));

    checkout
        .cart()
        .add_item(&Product::new("42", "Widget", Money::from_dollars(10)), None, 2)
        .await
        .unwrap();
    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();

    let placing = tokio::spawn({
        let checkout = checkout.clone();
        async move { checkout.place_order().await }
    });

    // The store goes down while settlement is in flight, so the post-charge
    // cart clear fails.
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.set_unavailable(true);

    let receipt = placing.await.unwrap().unwrap();
    assert_eq!(receipt.payment_id, "PAY-0001");
    assert_eq!(checkout.state().await.step, CheckoutStep::Success);
    assert_eq!(gateway.charge_count(), 1);

    store.set_unavailable(false);
    assert!(!checkout.cart().load().await.unwrap().cart.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reset_leaves_a_terminal_step() {
    let gateway = fast_gateway();
    let checkout = build_checkout(StaticSession::signed_in("user-1"), gateway.clone());
    fill_cart(&checkout).await;

    checkout.advance().await.unwrap();
    checkout.advance().await.unwrap();
    gateway.set_decline_next(true);
    let _ = checkout.place_order().await;
    assert_eq!(checkout.state().await.step, CheckoutStep::Failure);

    let state = checkout.reset().await;
    assert_eq!(state.step, CheckoutStep::Shipping);
    assert!(state.reviewed.is_none());
}
