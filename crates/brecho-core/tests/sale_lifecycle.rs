//! End-to-end lifecycle tests for the inventory & sale ledger.
//!
//! Each test drives the three services the way the embedding app does:
//! register items, compose a sale, pay, ship, deliver or cancel, and check
//! that stock, reservations, totals and delivery status stay consistent.

use chrono::{Duration, Utc};

use brecho_core::{
    Catalog, ClientInfo, CoreError, DeliveryStatus, DeliveryTracker, ItemStatus, LineRequest,
    NewItem, SaleLedger,
};

fn services() -> (Catalog, SaleLedger, DeliveryTracker) {
    (Catalog::new(), SaleLedger::new(), DeliveryTracker::new())
}

fn register(catalog: &mut Catalog, name: &str, price_cents: i64, quantity: i64) -> String {
    catalog
        .register(NewItem {
            name: name.to_string(),
            item_type: "roupa".to_string(),
            external_code: None,
            cost_cents: price_cents / 2,
            margin_bps: 0,
            price_cents: Some(price_cents),
            quantity,
        })
        .unwrap()
        .id
}

fn client() -> ClientInfo {
    ClientInfo {
        name: "Ana Souza".to_string(),
        phone: Some("11 99999-0000".to_string()),
        tax_id: Some("123.456.789-00".to_string()),
        address: Some("Rua das Flores, 10".to_string()),
    }
}

/// Pays product and freight, promoting the sale into the shipped pool.
fn pay_in_full(
    ledger: &mut SaleLedger,
    tracker: &mut DeliveryTracker,
    sale_id: &str,
    freight_cents: i64,
) {
    ledger.confirm_payment(tracker, sale_id).unwrap();
    ledger
        .update_freight(tracker, sale_id, freight_cents, true)
        .unwrap();
}

#[test]
fn adding_a_sale_reserves_the_item() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta jeans", 3000, 1);

    ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    let item = catalog.get(&item_a).unwrap();
    assert!(item.reserved);
    assert_eq!(item.status, ItemStatus::Reserved);
    assert!(catalog.list_available(None).is_empty());
}

#[test]
fn removing_the_line_returns_the_item_to_the_listing() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta jeans", 3000, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    ledger.remove_line(&mut catalog, &sale_id, &item_a).unwrap();

    let item = catalog.get(&item_a).unwrap();
    assert!(!item.reserved);
    assert_eq!(item.quantity, 1);
    assert_eq!(catalog.list_available(None).len(), 1);
    assert_eq!(ledger.get(&sale_id).unwrap().total_cents, 0);
}

#[test]
fn paying_product_and_freight_promotes_with_total_intact() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta jeans", 3000, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    pay_in_full(&mut ledger, &mut tracker, &sale_id, 1500);

    assert_eq!(ledger.open_count(), 0);
    let view = tracker.get(&sale_id).unwrap();
    assert_eq!(view.sale.total_cents, 3000);
    assert_eq!(view.sale.freight_cents, 1500);
    assert_eq!(view.status, DeliveryStatus::Pending);
}

#[test]
fn promotion_happens_in_both_flag_orders() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);
    let item_b = register(&mut catalog, "Bolsa", 1500, 1);

    // pay-then-freight
    let sale_a = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();
    ledger.confirm_payment(&mut tracker, &sale_a).unwrap();
    assert_eq!(tracker.len(), 0);
    ledger
        .update_freight(&mut tracker, &sale_a, 0, true)
        .unwrap();
    assert_eq!(tracker.len(), 1);

    // freight-then-pay
    let sale_b = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_b, 1)])
        .unwrap();
    ledger
        .update_freight(&mut tracker, &sale_b, 500, true)
        .unwrap();
    assert_eq!(tracker.len(), 1);
    ledger.confirm_payment(&mut tracker, &sale_b).unwrap();
    assert_eq!(tracker.len(), 2);

    assert_eq!(ledger.open_count(), 0);
}

#[test]
fn delivery_progression_deducts_stock_exactly_once() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta jeans", 3000, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();
    pay_in_full(&mut ledger, &mut tracker, &sale_id, 1500);

    let today = Utc::now().date_naive();
    let tomorrow = today + Duration::days(1);

    tracker
        .schedule_delivery(&mut catalog, &sale_id, tomorrow)
        .unwrap();
    assert_eq!(tracker.get(&sale_id).unwrap().status, DeliveryStatus::Scheduled);
    assert_eq!(catalog.get(&item_a).unwrap().quantity, 1);

    tracker.confirm_shipment(&sale_id).unwrap();
    let view = tracker.get(&sale_id).unwrap();
    assert_eq!(view.status, DeliveryStatus::Shipped);
    assert_eq!(view.shipped_date, Some(today));
    assert_eq!(catalog.get(&item_a).unwrap().quantity, 1);

    tracker.confirm_delivery(&mut catalog, &sale_id).unwrap();
    let view = tracker.get(&sale_id).unwrap();
    assert_eq!(view.status, DeliveryStatus::Delivered);
    assert_eq!(view.delivered_date, Some(today));

    let item = catalog.get(&item_a).unwrap();
    assert_eq!(item.quantity, 0);
    assert!(item.sold);
    assert_eq!(item.status, ItemStatus::Sold);
}

#[test]
fn cancelling_a_delivery_restores_the_item() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta jeans", 3000, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();
    pay_in_full(&mut ledger, &mut tracker, &sale_id, 1500);

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    tracker
        .schedule_delivery(&mut catalog, &sale_id, tomorrow)
        .unwrap();
    tracker.confirm_shipment(&sale_id).unwrap();

    tracker.cancel_delivery(&mut catalog, &sale_id).unwrap();

    let view = tracker.get(&sale_id).unwrap();
    assert_eq!(view.status, DeliveryStatus::Pending);
    assert!(view.sale.delivery_date.is_none());
    assert!(view.shipped_date.is_none());

    let item = catalog.get(&item_a).unwrap();
    assert!(!item.reserved);
    assert_eq!(item.quantity, 1);
    assert!(!item.sold);
    assert_eq!(catalog.list_available(None).len(), 1);
}

#[test]
fn overlapping_add_lines_reserves_each_item_once() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);
    let item_b = register(&mut catalog, "Bolsa", 1500, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    ledger
        .add_lines(
            &mut catalog,
            &sale_id,
            &[LineRequest::new(&item_a, 1), LineRequest::new(&item_b, 1)],
        )
        .unwrap();
    ledger
        .add_lines(
            &mut catalog,
            &sale_id,
            &[LineRequest::new(&item_b, 1)],
        )
        .unwrap();

    let sale = ledger.get(&sale_id).unwrap();
    assert_eq!(sale.lines.len(), 2);
    assert_eq!(sale.total_cents, 4500);
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 1);
    assert_eq!(catalog.get(&item_b).unwrap().reserved_qty, 1);
}

#[test]
fn deleting_a_sale_restores_pre_sale_reservation_counts() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 2);
    let item_b = register(&mut catalog, "Bolsa", 1500, 1);

    // A second sale holds one unit of item_a independently
    let other_sale = ledger
        .add_sale(&mut catalog, ClientInfo::named("Bia"), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    let sale_id = ledger
        .add_sale(
            &mut catalog,
            client(),
            &[LineRequest::new(&item_a, 1), LineRequest::new(&item_b, 1)],
        )
        .unwrap();
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 2);

    ledger
        .delete_sale(&mut catalog, &mut tracker, &sale_id)
        .unwrap();

    // Exactly the deleted sale's holds are gone; the other sale's remain
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 1);
    assert!(catalog.get(&item_a).unwrap().reserved);
    assert!(!catalog.get(&item_b).unwrap().reserved);
    assert!(ledger.get(&other_sale).is_ok());
}

#[test]
fn deleting_a_cancelled_delivery_leaves_other_holds_intact() {
    let (mut catalog, mut ledger, mut tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 2);

    let sale_a = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();
    pay_in_full(&mut ledger, &mut tracker, &sale_a, 0);

    // Cancelling releases sale A's unit
    tracker.cancel_delivery(&mut catalog, &sale_a).unwrap();
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 0);

    // Sale B takes one of the freed units
    let sale_b = ledger
        .add_sale(&mut catalog, ClientInfo::named("Bia"), &[LineRequest::new(&item_a, 1)])
        .unwrap();
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 1);

    // Deleting the cancelled sale must not release sale B's hold
    ledger
        .delete_sale(&mut catalog, &mut tracker, &sale_a)
        .unwrap();
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 1);
    assert!(catalog.get(&item_a).unwrap().reserved);
    assert!(ledger.get(&sale_b).is_ok());
}

#[test]
fn two_sales_cannot_hold_the_same_unit() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);

    ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    let err = ledger
        .add_sale(&mut catalog, ClientInfo::named("Bia"), &[LineRequest::new(&item_a, 1)])
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientStock { .. }));
    assert_eq!(ledger.open_count(), 1);
}

#[test]
fn catalog_price_edit_does_not_change_open_sale_total() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);
    let sale_id = ledger
        .add_sale(&mut catalog, client(), &[LineRequest::new(&item_a, 1)])
        .unwrap();

    catalog
        .update_pricing(&item_a, 2000, 0, Some(9900))
        .unwrap();

    assert_eq!(ledger.get(&sale_id).unwrap().total_cents, 3000);
    assert_eq!(catalog.get(&item_a).unwrap().price_cents, 9900);
}

#[test]
fn draft_lifecycle_stage_commit_and_cancel() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);
    let item_b = register(&mut catalog, "Bolsa", 1500, 1);

    // Staged lines hold stock immediately
    ledger
        .stage_line(&mut catalog, LineRequest::new(&item_a, 1))
        .unwrap();
    ledger
        .stage_line(&mut catalog, LineRequest::new(&item_b, 1))
        .unwrap();
    assert!(catalog.list_available(None).is_empty());

    // Cancel releases everything and clears the staged client
    ledger.set_draft_client(client()).unwrap();
    ledger.cancel_draft(&mut catalog).unwrap();
    assert_eq!(catalog.list_available(None).len(), 2);
    assert!(ledger.draft().is_empty());

    // Stage again and commit: no double reservation
    ledger
        .stage_line(&mut catalog, LineRequest::new(&item_a, 1))
        .unwrap();
    let sale_id = ledger.commit_draft(Some(client())).unwrap();
    assert_eq!(catalog.get(&item_a).unwrap().reserved_qty, 1);
    assert_eq!(ledger.get(&sale_id).unwrap().total_cents, 3000);
}

#[test]
fn failed_operations_leave_no_partial_state() {
    let (mut catalog, mut ledger, _tracker) = services();
    let item_a = register(&mut catalog, "Jaqueta", 3000, 1);

    // Second line is unknown: the whole sale must fail and roll back
    let err = ledger
        .add_sale(
            &mut catalog,
            client(),
            &[LineRequest::new(&item_a, 1), LineRequest::new("missing", 1)],
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::ItemNotFound(_)));

    let item = catalog.get(&item_a).unwrap();
    assert!(!item.reserved);
    assert_eq!(item.reserved_qty, 0);
    assert_eq!(ledger.open_count(), 0);
    assert_eq!(catalog.list_available(None).len(), 1);
}
