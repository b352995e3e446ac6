//! Quotation lifecycle: creation, lazy expiry, and exactly-once conversion.

mod common;

use chrono::{Duration, Utc};

use tally_core::{Cart, CoreError, Money, PaymentMethod, QuotationStatus, TaxRate};
use tally_engine::store::{PersistOutcome, QuotationFilter, RecordStore};
use tally_engine::EngineError;

use common::harness;

/// Snapshot of a cart holding `qty` sugar lines, via the live add path.
async fn sugar_snapshot(h: &common::Harness, qty: i64) -> tally_core::CartSnapshot {
    let mut cart = Cart::new();
    h.processor.add_to_cart(&mut cart, "sugar", qty).await.unwrap();
    cart.snapshot(h.processor.tax_rate())
}

#[tokio::test]
async fn created_quotation_is_pending_with_computed_totals() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 2).await;

    let quotation = h
        .quotations
        .create(
            "QT-001".into(),
            snapshot,
            Utc::now() + Duration::days(7),
            Some("cust-1".into()),
        )
        .await
        .unwrap();

    assert_eq!(quotation.status, QuotationStatus::Pending);
    assert_eq!(quotation.subtotal, Money::from_major(2000));
    assert_eq!(quotation.tax_total, Money::from_major(330));
    assert_eq!(quotation.total, Money::from_major(2330));

    let listed = h
        .quotations
        .list(&QuotationFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, QuotationStatus::Pending);
}

#[tokio::test]
async fn create_rejects_an_empty_cart_snapshot() {
    let h = harness();
    let snapshot = Cart::new().snapshot(h.processor.tax_rate());

    let err = h
        .quotations
        .create(
            "QT-000".into(),
            snapshot,
            Utc::now() + Duration::days(7),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Core(CoreError::EmptyCart)));
    let listed = h
        .quotations
        .list(&QuotationFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn conversion_failure_before_persist_leaves_the_quotation_pending() {
    let h = harness();
    // An item-less quotation written straight to the store, sidestepping
    // the create() guard, as a stale or foreign record might be.
    let quotation = tally_core::Quotation::new(
        "QT-040".into(),
        Vec::new(),
        TaxRate::from_bps(common::TEST_RATE_BPS),
        Utc::now() + Duration::days(7),
        None,
        Utc::now(),
    );
    h.records.create_quotation(&quotation).await.unwrap();

    let err = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Core(CoreError::EmptyCart)));

    // The sale was never built, so the quotation was never claimed.
    let stored = h.records.get_quotation(&quotation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuotationStatus::Pending);
    assert_eq!(h.records.sale_count(), 0);
}

#[tokio::test]
async fn conversion_creates_a_paid_in_full_sale_and_consumes_the_quotation() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 2).await;
    let quotation = h
        .quotations
        .create(
            "QT-002".into(),
            snapshot,
            Utc::now() + Duration::days(7),
            None,
        )
        .await
        .unwrap();

    let outcome = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap();

    assert_eq!(outcome.persistence, PersistOutcome::Committed);
    assert_eq!(outcome.sale.receipt_number(), "Q-QT-002");
    assert_eq!(outcome.sale.total(), Money::from_major(2330));
    assert_eq!(outcome.sale.paid(), outcome.sale.total());
    assert_eq!(outcome.sale.change(), Money::zero());

    // Quotation consumed, stock moved through the shared commit path.
    let stored = h.records.get_quotation(&quotation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuotationStatus::Converted);
    assert_eq!(h.products.stock_of("sugar"), Some(48));
}

#[tokio::test]
async fn second_conversion_fails_and_exactly_one_sale_exists() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 1).await;
    let quotation = h
        .quotations
        .create(
            "QT-003".into(),
            snapshot,
            Utc::now() + Duration::days(7),
            None,
        )
        .await
        .unwrap();

    h.quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap();

    let err = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Core(CoreError::NotConvertible {
            status: QuotationStatus::Converted,
            ..
        })
    ));
    assert_eq!(h.records.sale_count(), 1);
}

#[tokio::test]
async fn expired_quotation_resolves_on_read_and_cannot_convert() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 1).await;
    let quotation = h
        .quotations
        .create(
            "QT-004".into(),
            snapshot,
            Utc::now() - Duration::days(1),
            None,
        )
        .await
        .unwrap();
    assert_eq!(quotation.status, QuotationStatus::Pending);

    let err = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::NotConvertible {
            status: QuotationStatus::Expired,
            ..
        })
    ));

    // The lazily-observed expiry was written back.
    let stored = h.records.get_quotation(&quotation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuotationStatus::Expired);
    assert_eq!(h.records.sale_count(), 0);
}

#[tokio::test]
async fn listing_applies_and_persists_lazy_expiry() {
    let h = harness();
    let fresh = sugar_snapshot(&h, 1).await;
    let stale = sugar_snapshot(&h, 2).await;

    h.quotations
        .create("QT-010".into(), fresh, Utc::now() + Duration::days(7), None)
        .await
        .unwrap();
    let expired = h
        .quotations
        .create("QT-011".into(), stale, Utc::now() - Duration::hours(1), None)
        .await
        .unwrap();

    let listed = h
        .quotations
        .list(&QuotationFilter {
            status: Some(QuotationStatus::Expired),
            customer_id: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quotation_number, "QT-011");

    let stored = h.records.get_quotation(&expired.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuotationStatus::Expired);
}

#[tokio::test]
async fn conversion_recomputes_totals_instead_of_trusting_stored_figures() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 2).await;
    let mut quotation = tally_core::Quotation::new(
        "QT-020".into(),
        snapshot.items,
        TaxRate::from_bps(common::TEST_RATE_BPS),
        Utc::now() + Duration::days(7),
        None,
        Utc::now(),
    );
    // Stored totals edited out from under the engine.
    quotation.total = Money::from_major(1);
    quotation.subtotal = Money::from_major(1);
    quotation.tax_total = Money::zero();
    h.records.create_quotation(&quotation).await.unwrap();

    let outcome = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap();

    assert_eq!(outcome.sale.total(), Money::from_major(2330));
    assert_eq!(outcome.sale.paid(), Money::from_major(2330));
}

#[tokio::test]
async fn persist_failure_releases_the_conversion_claim() {
    let h = harness();
    let snapshot = sugar_snapshot(&h, 1).await;
    let quotation = h
        .quotations
        .create(
            "QT-030".into(),
            snapshot,
            Utc::now() + Duration::days(7),
            None,
        )
        .await
        .unwrap();

    h.records.set_sale_failure(true);
    let err = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));

    // Claim rolled back: the quotation is convertible once the backend
    // recovers, and still no sale exists.
    let stored = h.records.get_quotation(&quotation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, QuotationStatus::Pending);
    assert_eq!(h.records.sale_count(), 0);

    h.records.set_sale_failure(false);
    let outcome = h
        .quotations
        .convert(&quotation.id, PaymentMethod::Cash, "staff-1")
        .await
        .unwrap();
    assert_eq!(outcome.persistence, PersistOutcome::Committed);
    assert_eq!(h.records.sale_count(), 1);
}
