//! End-to-end register flows through the `Terminal` service.

use chrono::{Duration, Utc};
use till_core::{
    BusinessSnapshot, CartLine, CoreError, HeldCart, Money, PreferencesSnapshot, Product,
    SessionExpiryPolicy, SessionState, TaxRate, TenderAllocation, TenderMethod, Terminal,
};

fn shop() -> Terminal {
    Terminal::new(
        TaxRate::from_percent(18),
        vec![
            Product::new("P", "Bread", Money::from_units(2_500), 10),
            Product::new("Q", "Milk", Money::from_units(500), 100),
            Product::new("Z", "Eggs", Money::from_units(300), 0),
        ],
    )
}

/// Opens with a 50,000 float and rings up 2 × P and 2 × Q.
fn shop_with_cart() -> Terminal {
    let mut till = shop();
    till.open_register("amina", Money::from_units(50_000)).unwrap();
    till.add_item("P").unwrap();
    till.add_item("P").unwrap();
    till.add_item("Q").unwrap();
    till.set_quantity("Q", 2).unwrap();
    till
}

#[test]
fn exact_cash_sale_updates_stock_balance_and_ledger() {
    let mut till = shop_with_cart();

    let quote = till.quote();
    assert_eq!(quote.subtotal.units(), 6_000);
    assert_eq!(quote.tax.units(), 1_080);
    assert_eq!(quote.total.units(), 7_080);

    let sale = till
        .checkout(TenderAllocation::cash(Money::from_units(7_080)))
        .unwrap()
        .clone();

    assert_eq!(sale.sequence_number, 1);
    assert_eq!(sale.total.units(), 7_080);
    assert_eq!(sale.change_due, Money::zero());
    assert_eq!(sale.item_count(), 4);
    assert_eq!(till.stock().on_hand("P"), Some(8));
    assert_eq!(till.stock().on_hand("Q"), Some(98));
    assert_eq!(till.register().current().unwrap().balance.units(), 57_080);
    assert!(till.cart().is_empty());
    assert_eq!(till.sales().len(), 1);
}

#[test]
fn short_payment_changes_nothing() {
    let mut till = shop_with_cart();

    let err = till
        .checkout(TenderAllocation::cash(Money::from_units(5_000)))
        .unwrap_err();

    match err {
        CoreError::InsufficientPayment { shortfall, .. } => {
            assert_eq!(shortfall.units(), 2_080)
        }
        other => panic!("expected InsufficientPayment, got {other:?}"),
    }
    assert_eq!(till.cart().total_quantity(), 4);
    assert_eq!(till.stock().on_hand("P"), Some(10));
    assert_eq!(till.stock().on_hand("Q"), Some(100));
    assert_eq!(till.register().current().unwrap().balance.units(), 50_000);
    assert!(till.sales().is_empty());
}

#[test]
fn close_after_exact_sale_balances() {
    let mut till = shop_with_cart();
    till.checkout(TenderAllocation::cash(Money::from_units(7_080)))
        .unwrap();

    let closed = till.close_register(Some(Money::from_units(57_080))).unwrap();
    let rec = closed.reconciliation.clone().unwrap();

    assert_eq!(closed.state, SessionState::Closed);
    assert_eq!(rec.expected_cash.units(), 57_080);
    assert_eq!(rec.variance, Money::zero());
    assert_eq!(rec.sale_count, 1);
    assert!(!till.register().is_open());
}

#[test]
fn out_of_stock_product_is_rejected() {
    let mut till = shop();
    till.open_register("amina", Money::zero()).unwrap();

    let err = till.add_item("Z").unwrap_err();
    assert!(matches!(err, CoreError::OutOfStock { .. }));
    assert!(till.cart().is_empty());
}

#[test]
fn closed_register_rejects_cart_changes() {
    let mut till = shop();
    assert_eq!(till.add_item("P").unwrap_err(), CoreError::RegisterClosed);
    assert!(till.cart().is_empty());
}

#[test]
fn second_open_is_rejected() {
    let mut till = shop();
    till.open_register("amina", Money::from_units(1_000)).unwrap();
    assert!(matches!(
        till.open_register("baraka", Money::from_units(1_000)),
        Err(CoreError::SessionAlreadyOpen { .. })
    ));
    assert_eq!(till.register().current().unwrap().opened_by, "amina");
}

#[test]
fn variance_compares_count_with_float_plus_cash_tendered() {
    let mut till = shop();
    till.open_register("amina", Money::from_units(10_000)).unwrap();

    // 590 due, 1,000 cash handed over, 410 change.
    till.add_item("Q").unwrap();
    till.checkout(TenderAllocation::cash(Money::from_units(1_000)))
        .unwrap();

    // 2,950 due, all by card.
    till.add_item("P").unwrap();
    till.checkout(
        TenderAllocation::default().with(TenderMethod::Card, Money::from_units(2_950)),
    )
    .unwrap();

    let summary = till.session_summary().unwrap();
    assert_eq!(summary.cash.units(), 1_000);
    assert_eq!(summary.cash_collected.units(), 590);
    assert_eq!(summary.change_given.units(), 410);
    assert_eq!(summary.card.units(), 2_950);

    let closed = till.close_register(Some(Money::from_units(10_500))).unwrap();
    let rec = closed.reconciliation.as_ref().unwrap();
    assert_eq!(rec.cash_sales.units(), 1_000);
    assert_eq!(rec.change_given.units(), 410);
    assert_eq!(rec.expected_cash.units(), 11_000);
    assert_eq!(rec.variance.units(), 10_500 - 11_000);
    assert_eq!(closed.balance.units(), 10_000 + 590 + 2_950);
}

#[test]
fn over_tendered_cash_counts_in_full_at_close() {
    let mut till = shop_with_cart();
    till.checkout(TenderAllocation::cash(Money::from_units(10_000)))
        .unwrap();

    let closed = till.close_register(Some(Money::from_units(60_000))).unwrap();
    let rec = closed.reconciliation.as_ref().unwrap();
    assert_eq!(rec.expected_cash.units(), 60_000);
    assert_eq!(rec.variance, Money::zero());
    assert_eq!(rec.change_given.units(), 2_920);
}

#[test]
fn sequence_numbers_continue_across_sessions() {
    let mut till = shop();
    for expected in 1..=3u64 {
        till.open_register("amina", Money::zero()).unwrap();
        till.add_item("Q").unwrap();
        let sale = till
            .checkout(TenderAllocation::cash(Money::from_units(590)))
            .unwrap();
        assert_eq!(sale.sequence_number, expected);
        till.close_register(Some(Money::from_units(590))).unwrap();
    }
    assert_eq!(till.register().history().len(), 3);
}

#[test]
fn held_cart_survives_snapshots() {
    let mut till = shop();
    till.open_register("amina", Money::zero()).unwrap();
    till.add_item("P").unwrap();
    let held_id = till.hold_cart("  Table 4 ").unwrap().id.clone();

    let business: BusinessSnapshot =
        serde_json::from_str(&serde_json::to_string(&till.business_snapshot()).unwrap()).unwrap();
    let prefs: PreferencesSnapshot =
        serde_json::from_str(&serde_json::to_string(&till.preferences_snapshot()).unwrap())
            .unwrap();

    let (mut restored, recovery) = Terminal::restore(
        TaxRate::from_percent(18),
        business,
        prefs,
        &SessionExpiryPolicy::default(),
        Utc::now(),
    );
    assert!(recovery.expired.is_none());
    assert_eq!(restored.cart().held()[0].name, "Table 4");

    restored.resume_cart(&held_id).unwrap();
    let sale = restored
        .checkout(TenderAllocation::cash(Money::from_units(2_950)))
        .unwrap();
    assert_eq!(sale.total.units(), 2_950);
}

#[test]
fn stale_session_is_not_resumed() {
    let mut till = shop();
    till.open_register("amina", Money::from_units(5_000)).unwrap();

    let (mut restored, recovery) = Terminal::restore(
        TaxRate::from_percent(18),
        till.business_snapshot(),
        till.preferences_snapshot(),
        &SessionExpiryPolicy::new(Duration::hours(8)),
        Utc::now() + Duration::hours(9),
    );

    assert!(recovery.resumed.is_none());
    assert!(recovery.expired.is_some());
    assert!(!restored.register().is_open());
    assert_eq!(restored.add_item("P").unwrap_err(), CoreError::RegisterClosed);
    restored
        .open_register("baraka", Money::from_units(5_000))
        .unwrap();
}

#[test]
fn oversized_tender_is_rejected_without_side_effects() {
    let mut till = shop_with_cart();

    let tender = TenderAllocation::cash(Money::from_units(i64::MAX))
        .with(TenderMethod::Card, Money::from_units(1));
    let err = till.checkout(tender).unwrap_err();

    assert!(matches!(err, CoreError::InvalidTender { .. }));
    assert_eq!(till.stock().on_hand("P"), Some(10));
    assert_eq!(till.cart().lines().len(), 2);
    assert!(till.sales().is_empty());
    assert_eq!(till.register().current().unwrap().balance.units(), 50_000);
}

fn line(product_id: &str, unit_price: i64, quantity: i64) -> CartLine {
    CartLine {
        product_id: product_id.to_string(),
        name: product_id.to_string(),
        unit_price: Money::from_units(unit_price),
        quantity,
    }
}

/// Restores a till with an open session whose documents were edited on disk.
fn restore_with(active_cart: Vec<CartLine>, held_carts: Vec<HeldCart>) -> Terminal {
    let mut till = shop();
    till.open_register("amina", Money::zero()).unwrap();

    let mut prefs = till.preferences_snapshot();
    prefs.active_cart = active_cart;
    prefs.held_carts = held_carts;

    let (restored, recovery) = Terminal::restore(
        TaxRate::from_percent(18),
        till.business_snapshot(),
        prefs,
        &SessionExpiryPolicy::default(),
        Utc::now(),
    );
    assert!(recovery.resumed.is_some());
    restored
}

#[test]
fn restored_duplicate_lines_cannot_oversell() {
    let mut till = restore_with(vec![line("P", 2_500, 6), line("P", 2_500, 6)], Vec::new());

    assert_eq!(till.cart().lines().len(), 1);
    assert_eq!(till.cart().lines()[0].quantity, 12);

    let err = till
        .checkout(TenderAllocation::cash(Money::from_units(40_000)))
        .unwrap_err();
    assert_eq!(
        err,
        CoreError::InsufficientStock {
            product_id: "P".into(),
            available: 10,
            requested: 12,
        }
    );
    assert_eq!(till.stock().on_hand("P"), Some(10));
    assert!(till.sales().is_empty());
    assert!(till.register().current().unwrap().balance.is_zero());
}

#[test]
fn resumed_held_cart_over_stock_is_rejected_at_checkout() {
    let held = HeldCart {
        id: "held-1".into(),
        name: "Table 4".into(),
        lines: vec![line("P", 2_500, 7), line("P", 2_500, 4)],
        held_at: Utc::now(),
    };
    let mut till = restore_with(Vec::new(), vec![held]);
    till.resume_cart("held-1").unwrap();

    let err = till
        .checkout(TenderAllocation::cash(Money::from_units(40_000)))
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::InsufficientStock { available: 10, requested: 11, .. }
    ));
    assert_eq!(till.stock().on_hand("P"), Some(10));
    assert!(till.sales().is_empty());
}

#[test]
fn stock_never_goes_negative_across_a_shift() {
    let mut till = restore_with(vec![line("P", 2_500, 6), line("P", 2_500, 6)], Vec::new());

    assert!(till
        .checkout(TenderAllocation::cash(Money::from_units(40_000)))
        .is_err());

    till.set_quantity("P", 10).unwrap();
    till.checkout(TenderAllocation::cash(Money::from_units(29_500)))
        .unwrap();
    assert_eq!(till.stock().on_hand("P"), Some(0));

    assert!(till.add_item("P").is_err());
    assert!(till.add_item("Z").is_err());
    till.add_item("Q").unwrap();
    till.checkout(TenderAllocation::cash(Money::from_units(590)))
        .unwrap();

    assert!(till.stock().products().all(|p| p.stock >= 0));
    assert_eq!(till.sales().len(), 2);
}
