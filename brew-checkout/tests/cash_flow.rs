mod common;

use brew_checkout::{CashState, CheckoutError, CheckoutKind, CheckoutState};
use common::{Harness, product};
use rust_decimal::Decimal;
use shared::models::{DiscountPercent, SugarLevel};
use shared::payment::PaymentMethod;

#[tokio::test]
async fn test_tender_below_total_cannot_confirm() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1)]);

    let due = h.cash.begin().unwrap();
    assert_eq!(due, Decimal::new(11200, 2));

    assert_eq!(h.cash.enter_tendered(100.0).unwrap(), Decimal::ZERO);
    assert!(!h.cash.can_confirm());
    let err = h.cash.confirm(&mut h.session).await.unwrap_err();
    assert!(matches!(err, CheckoutError::InsufficientTender { .. }));
    assert_eq!(h.cash.state(), &CashState::AmountEntry);
    assert_eq!(h.backend.purchase_count(), 0);
}

#[tokio::test]
async fn test_confirm_submits_cash_purchases_and_returns_change() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1)]);

    h.cash.begin().unwrap();
    assert_eq!(h.cash.enter_tendered(200.0).unwrap(), Decimal::new(8800, 2));
    assert!(h.cash.can_confirm());

    let receipt = h.cash.confirm(&mut h.session).await.unwrap();
    assert_eq!(receipt.change, Decimal::new(8800, 2));
    assert_eq!(receipt.grand_total, Decimal::new(11200, 2));
    assert!(matches!(h.cash.state(), CashState::Completed(_)));

    let purchases = h.backend.purchases.lock().clone();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].payment_method, PaymentMethod::Cash);
    assert!(purchases[0].payment_reference.is_none());

    assert!(h.register.is_empty());
    assert_eq!(h.register.guard().state(), CheckoutState::NoCheckout);
}

#[tokio::test]
async fn test_purchase_carries_modifiers_and_discount() {
    let mut h = Harness::new();
    let mut wizard = brew_checkout::ModifierSelectionFlow::new();
    let latte = product(2);
    h.register.edit(|cart| wizard.open(&latte, cart)).unwrap().unwrap();
    wizard.choose_size(22).unwrap();
    wizard.confirm_size().unwrap();
    wizard.choose_sugar(SugarLevel::Half).unwrap();
    h.register.edit(|cart| wizard.commit(cart)).unwrap().unwrap();
    h.register.set_discount(DiscountPercent::new(20).unwrap()).unwrap();

    // 160 + 19.20 - 32
    assert_eq!(h.cash.begin().unwrap(), Decimal::new(14720, 2));
    h.cash.enter_tendered(147.20).unwrap();
    h.cash.confirm(&mut h.session).await.unwrap();

    let purchase = h.backend.purchases.lock()[0].clone();
    assert_eq!(purchase.menu_item_id, 2);
    assert_eq!(purchase.menu_item_size_id, Some(22));
    assert_eq!(purchase.size.as_deref(), Some("16oz"));
    assert_eq!(purchase.sugar_level, Some(SugarLevel::Half));
    assert_eq!(purchase.discount_percent.value(), 20);
    assert_eq!(purchase.tax, 12);
}

#[tokio::test]
async fn test_failed_submission_is_retryable() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1), (3, "Croissant", 85, 2)]);
    h.backend.fail_purchases();

    h.cash.begin().unwrap();
    h.cash.enter_tendered(1000.0).unwrap();
    let err = h.cash.confirm(&mut h.session).await.unwrap_err();
    assert!(matches!(err, CheckoutError::LineRejected { ref line, .. } if line == "Americano"));
    assert!(matches!(h.cash.state(), CashState::Failed(_)));
    assert_eq!(h.register.lines().len(), 2);
    assert_eq!(h.register.guard().state(), CheckoutState::Active(CheckoutKind::Cash));

    h.backend.accept_all();
    let receipt = h.cash.confirm(&mut h.session).await.unwrap();
    assert_eq!(receipt.lines, 2);
    assert!(h.register.is_empty());
}

#[tokio::test]
async fn test_retry_after_partial_failure_sends_only_unrecorded_lines() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1), (2, "Latte", 140, 1), (3, "Croissant", 85, 1)]);
    h.backend.reject_product(2, "Insufficient stock");

    h.cash.begin().unwrap();
    h.cash.enter_tendered(1000.0).unwrap();
    let err = h.cash.confirm(&mut h.session).await.unwrap_err();
    assert_eq!(err.accepted_ids(), &[1, 3]);
    assert_eq!(h.backend.purchased_ids(), vec![1, 3]);
    assert!(h.cash.can_confirm());

    h.backend.accept_all();
    let receipt = h.cash.confirm(&mut h.session).await.unwrap();
    assert_eq!(receipt.lines, 3);
    // 325 + 39 tax
    assert_eq!(receipt.grand_total, Decimal::from(364));
    assert_eq!(h.backend.purchased_ids(), vec![1, 3, 2]);
    assert!(h.register.is_empty());
}

#[tokio::test]
async fn test_second_failure_keeps_earlier_progress() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1), (2, "Latte", 140, 1), (3, "Croissant", 85, 1)]);
    h.backend.reject_product(2, "Insufficient stock");
    h.backend.reject_product(3, "Sold out");

    h.cash.begin().unwrap();
    h.cash.enter_tendered(1000.0).unwrap();
    h.cash.confirm(&mut h.session).await.unwrap_err();

    h.backend.accept_all();
    h.backend.reject_product(2, "Insufficient stock");
    let err = h.cash.confirm(&mut h.session).await.unwrap_err();
    assert_eq!(err.accepted_ids(), &[3]);

    h.backend.accept_all();
    h.cash.confirm(&mut h.session).await.unwrap();
    assert_eq!(h.backend.purchased_ids(), vec![1, 3, 2]);
}

#[tokio::test]
async fn test_cancel_after_partial_failure_drops_recorded_lines() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1), (2, "Latte", 140, 1)]);
    h.backend.reject_product(2, "Insufficient stock");

    h.cash.begin().unwrap();
    h.cash.enter_tendered(500.0).unwrap();
    h.cash.confirm(&mut h.session).await.unwrap_err();
    h.cash.cancel(&mut h.session);

    let lines = h.register.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, 2);
    assert_eq!(h.register.guard().state(), CheckoutState::NoCheckout);

    h.backend.accept_all();
    // 140 + 16.80 tax
    assert_eq!(h.cash.begin().unwrap(), Decimal::new(15680, 2));
    h.cash.enter_tendered(200.0).unwrap();
    h.cash.confirm(&mut h.session).await.unwrap();
    assert_eq!(h.backend.purchased_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_cancel_keeps_cart_and_unlocks_register() {
    let mut h = Harness::new();
    h.fill(&[(1, "Americano", 100, 1)]);
    h.cash.begin().unwrap();
    assert!(h.register.edit(|cart| cart.clear()).is_err());

    h.cash.cancel(&mut h.session);
    assert_eq!(h.cash.state(), &CashState::Idle);
    assert_eq!(h.register.lines().len(), 1);
    assert!(h.register.edit(|cart| cart.len()).is_ok());
    assert!(h.cash.confirm(&mut h.session).await.is_err());
}

#[tokio::test]
async fn test_only_one_checkout_at_a_time() {
    let h = Harness::new();
    let mut cash = brew_checkout::CashCheckout::new(h.backend.clone(), h.store.clone(), h.register.clone());
    h.fill(&[(1, "Americano", 100, 1)]);
    cash.begin().unwrap();

    let err = h.gcash.start(&h.session).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::CheckoutInProgress {
            active: CheckoutKind::Cash
        }
    ));
    let err = h.hold.hold(&h.session).await.unwrap_err();
    assert!(matches!(err, CheckoutError::CheckoutInProgress { .. }));
    assert!(h.backend.intents.lock().is_empty());
    assert!(h.backend.hold_requests.lock().is_empty());
}

#[tokio::test]
async fn test_begin_on_empty_cart() {
    let mut h = Harness::new();
    assert!(matches!(h.cash.begin(), Err(CheckoutError::EmptyCart)));
    assert_eq!(h.register.guard().state(), CheckoutState::NoCheckout);
}

#[tokio::test]
async fn test_out_of_stock_cannot_reach_cart() {
    let h = Harness::new();
    let mut wizard = brew_checkout::ModifierSelectionFlow::new();
    let matcha = product(4);
    let result = h.register.edit(|cart| wizard.open(&matcha, cart)).unwrap();
    assert!(matches!(result, Err(CheckoutError::OutOfStock(_))));
    assert!(h.register.is_empty());
}
