//! # Domain Types
//!
//! Core domain types for Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! Product ──snapshot──► LineItem ──collected by──► Cart / Quotation
//!                                          │
//!                                          ▼
//!                              Sale (immutable, committed)
//! ```
//!
//! ## Snapshot Pattern
//! A [`LineItem`] freezes the product's name, SKU, price and taxability at
//! the moment it enters a cart or quotation. Later edits to the product do
//! not rewrite history.
//!
//! ## Canonical Shapes
//! The upstream stores are free to speak whatever wire format they like;
//! mapping into these structs is an adapter concern. Inside the engine there
//! is exactly one shape per concept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::totals::TotalsSummary;

// =============================================================================
// Product
// =============================================================================

/// A product as reported by the external Product Store.
///
/// The engine never owns products; it reads them at add-to-cart time and
/// snapshots what it needs onto a [`LineItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque identifier, foreign to the Product Store.
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.), if labelled.
    pub barcode: Option<String>,

    /// Selling price in minor units.
    pub selling_price: Money,

    /// Cost price, snapshotted for margin reporting.
    pub cost_price: Money,

    /// Current stock level. May legitimately be negative under the
    /// best-effort decrement policy.
    pub stock_quantity: i64,

    /// Whether this product attracts tax.
    pub taxable: bool,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product's presence in a cart, quotation, or sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product ID (foreign reference for stock decrement).
    pub product_id: String,

    /// Name at time of adding (frozen).
    pub product_name: String,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Units of this product. Always >= 1; the cart rejects anything less.
    pub quantity: i64,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Cost price at time of adding (frozen, margin reporting).
    pub cost_price: Money,

    /// Absolute discount on the whole line, never a percentage.
    pub discount: Money,

    /// Taxability, inherited from the product at add time.
    pub taxable: bool,
}

impl LineItem {
    /// Snapshots a product into a new line.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            quantity,
            unit_price: product.selling_price,
            cost_price: product.cost_price,
            discount: Money::zero(),
            taxable: product.taxable,
        }
    }

    /// `unit_price * quantity - discount`, clamped to >= 0.
    ///
    /// The clamp is a floor, not policy: [`Cart::update_discount`] rejects
    /// discounts that would invert the sign before they ever land here.
    ///
    /// [`Cart::update_discount`]: crate::cart::Cart::update_discount
    pub fn line_total(&self) -> Money {
        (self.unit_price.times(self.quantity) - self.discount).clamp_non_negative()
    }

    /// Gross amount before discount.
    pub fn gross(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer settles a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; tendered amount may exceed the total (change due).
    Cash,
    /// Mobile money transfer (Airtel Money, TNM Mpamba, ...).
    MobileMoney,
    /// Card on an external terminal.
    BankCard,
    /// Sale on account, settled later.
    Credit,
}

impl PaymentMethod {
    /// Only cash can be tendered above the total; every other method pays
    /// exactly the sale total.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

/// A payment tendered at checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,

    /// Amount the customer handed over. Ignored for non-cash methods,
    /// which always settle at exactly the total.
    pub tendered: Money,
}

impl Payment {
    pub fn cash(tendered: Money) -> Self {
        Payment {
            method: PaymentMethod::Cash,
            tendered,
        }
    }

    /// A non-cash payment settling at exactly the sale total.
    pub fn exact(method: PaymentMethod) -> Self {
        Payment {
            method,
            tendered: Money::zero(),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Status of a committed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Paid and final.
    Completed,
    /// Reversed by a compensating record. Sales are never edited in place;
    /// voiding exists on the record so stores can represent it.
    Voided,
}

/// An immutable record of a completed transaction.
///
/// ## Immutability
/// All fields are private; there are no setters and no `&mut` accessors.
/// A `Sale` is constructed exactly once, by [`Sale::from_checkout`] or
/// [`Sale::paid_in_full`], both of which recompute and validate every
/// derived total. Corrections happen via new compensating records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    id: String,
    receipt_number: String,
    items: Vec<LineItem>,
    subtotal: Money,
    discount_total: Money,
    tax_total: Money,
    total: Money,
    paid: Money,
    change: Money,
    payment_method: PaymentMethod,
    staff_id: String,
    customer_id: Option<String>,
    status: SaleStatus,
    created_at: DateTime<Utc>,
}

impl Sale {
    /// Builds a completed sale from a live checkout.
    ///
    /// Recomputes all totals from the items (never trusts caller-supplied
    /// figures) and enforces:
    /// - non-empty items ([`CoreError::EmptyCart`])
    /// - cash tendered >= total ([`CoreError::InsufficientPayment`])
    /// - `change = max(paid - total, 0)`; non-cash pays exactly, change zero
    pub fn from_checkout(
        receipt_number: String,
        items: Vec<LineItem>,
        tax_rate: TaxRate,
        payment: Payment,
        staff_id: String,
        customer_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> CoreResult<Sale> {
        if items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let totals = TotalsSummary::compute(&items, tax_rate);

        let (paid, change) = if payment.method.is_cash() {
            if payment.tendered < totals.total {
                return Err(CoreError::InsufficientPayment {
                    required: totals.total,
                    tendered: payment.tendered,
                });
            }
            (payment.tendered, payment.tendered - totals.total)
        } else {
            (totals.total, Money::zero())
        };

        Ok(Sale {
            id: Uuid::new_v4().to_string(),
            receipt_number,
            items,
            subtotal: totals.subtotal,
            discount_total: totals.discount_total,
            tax_total: totals.tax,
            total: totals.total,
            paid,
            change,
            payment_method: payment.method,
            staff_id,
            customer_id,
            status: SaleStatus::Completed,
            created_at,
        })
    }

    /// Builds a sale settled at exactly its total, no change due.
    ///
    /// This is the quotation-conversion path: the source defaults to a
    /// cash-equivalent full payment.
    pub fn paid_in_full(
        receipt_number: String,
        items: Vec<LineItem>,
        tax_rate: TaxRate,
        method: PaymentMethod,
        staff_id: String,
        customer_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> CoreResult<Sale> {
        if items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let total = TotalsSummary::compute(&items, tax_rate).total;
        Sale::from_checkout(
            receipt_number,
            items,
            tax_rate,
            Payment { method, tendered: total },
            staff_id,
            customer_id,
            created_at,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt_number
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount_total(&self) -> Money {
        self.discount_total
    }

    pub fn tax_total(&self) -> Money {
        self.tax_total
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn paid(&self) -> Money {
        self.paid
    }

    pub fn change(&self) -> Money {
        self.change
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn staff_id(&self) -> &str {
        &self.staff_id
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// Lifecycle of a quotation.
///
/// `Pending` is the only live state. `Rejected`, `Expired` and `Converted`
/// are terminal; `Accepted` is a bookkeeping state some stores record before
/// conversion and is terminal from this engine's point of view (conversion
/// requires `Pending`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

impl QuotationStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuotationStatus::Rejected | QuotationStatus::Expired | QuotationStatus::Converted
        )
    }
}

/// A proposed, time-bounded sale offer.
///
/// Unlike [`Sale`], quotations are mutable records owned by the Record
/// Store; this struct is the canonical in-engine shape of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: String,
    pub quotation_number: String,
    pub items: Vec<LineItem>,

    /// Stored totals, kept for listing screens. Conversion never trusts
    /// them; it recomputes from `items`.
    pub subtotal: Money,
    pub discount_total: Money,
    pub tax_total: Money,
    pub total: Money,

    pub valid_until: DateTime<Utc>,
    pub status: QuotationStatus,
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Creates a pending quotation, computing stored totals from the items.
    pub fn new(
        quotation_number: String,
        items: Vec<LineItem>,
        tax_rate: TaxRate,
        valid_until: DateTime<Utc>,
        customer_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let totals = TotalsSummary::compute(&items, tax_rate);
        Quotation {
            id: Uuid::new_v4().to_string(),
            quotation_number,
            items,
            subtotal: totals.subtotal,
            discount_total: totals.discount_total,
            tax_total: totals.tax,
            total: totals.total,
            valid_until,
            status: QuotationStatus::Pending,
            customer_id,
            created_at,
        }
    }

    /// Lazy expiry: the status this quotation should be treated as, now.
    ///
    /// A pending quotation past its validity reads as `Expired`. Every path
    /// that inspects status MUST go through this (listing, conversion) so an
    /// expired quotation can never be converted. The caller is responsible
    /// for writing the transition back to the store.
    pub fn effective_status(&self, now: DateTime<Utc>) -> QuotationStatus {
        if self.status == QuotationStatus::Pending && now > self.valid_until {
            QuotationStatus::Expired
        } else {
            self.status
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record, read-only from this engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(id: &str, price_minor: i64, taxable: bool) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            sku: format!("SKU-{id}"),
            barcode: None,
            selling_price: Money::from_minor(price_minor),
            cost_price: Money::from_minor(price_minor / 2),
            stock_quantity: 10,
            taxable,
        }
    }

    #[test]
    fn line_total_basic() {
        let mut line = LineItem::from_product(&product("1", 1000, true), 3);
        assert_eq!(line.line_total().minor(), 3000);

        line.discount = Money::from_minor(500);
        assert_eq!(line.line_total().minor(), 2500);
    }

    #[test]
    fn line_total_never_negative() {
        let mut line = LineItem::from_product(&product("1", 1000, true), 1);
        // The cart rejects this discount; the floor still holds if one
        // arrives through a deserialized quotation.
        line.discount = Money::from_minor(5000);
        assert_eq!(line.line_total(), Money::zero());
    }

    #[test]
    fn sale_cash_change() {
        let items = vec![LineItem::from_product(&product("1", 100_000, true), 2)];
        // subtotal 2000.00, tax 330.00, total 2330.00
        let sale = Sale::from_checkout(
            "RCP-1".into(),
            items,
            TaxRate::from_bps(1650),
            Payment::cash(Money::from_major(2500)),
            "staff-1".into(),
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(sale.total(), Money::from_major(2330));
        assert_eq!(sale.paid(), Money::from_major(2500));
        assert_eq!(sale.change(), Money::from_major(170));
        assert_eq!(sale.status(), SaleStatus::Completed);
    }

    #[test]
    fn sale_rejects_insufficient_cash() {
        let items = vec![LineItem::from_product(&product("1", 100_000, true), 2)];
        let err = Sale::from_checkout(
            "RCP-2".into(),
            items,
            TaxRate::from_bps(1650),
            Payment::cash(Money::from_major(2000)),
            "staff-1".into(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { .. }));
    }

    #[test]
    fn sale_non_cash_pays_exactly() {
        let items = vec![LineItem::from_product(&product("1", 100_000, true), 2)];
        let sale = Sale::from_checkout(
            "RCP-3".into(),
            items,
            TaxRate::from_bps(1650),
            Payment::exact(PaymentMethod::MobileMoney),
            "staff-1".into(),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(sale.paid(), sale.total());
        assert_eq!(sale.change(), Money::zero());
    }

    #[test]
    fn sale_rejects_empty_items() {
        let err = Sale::from_checkout(
            "RCP-4".into(),
            Vec::new(),
            TaxRate::zero(),
            Payment::cash(Money::from_major(100)),
            "staff-1".into(),
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn sale_totals_reconcile() {
        let items = vec![
            LineItem::from_product(&product("1", 50_000, false), 1),
            LineItem::from_product(&product("2", 100_000, true), 1),
        ];
        let sale = Sale::paid_in_full(
            "RCP-5".into(),
            items,
            TaxRate::from_bps(1650),
            PaymentMethod::Cash,
            "staff-1".into(),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(sale.subtotal() + sale.tax_total(), sale.total());
        // Only the taxable K1,000 line is taxed: K165.00
        assert_eq!(sale.tax_total(), Money::from_major(165));
    }

    #[test]
    fn quotation_lazy_expiry() {
        let now = Utc::now();
        let q = Quotation::new(
            "QT-001".into(),
            vec![LineItem::from_product(&product("1", 1000, true), 1)],
            TaxRate::from_bps(1650),
            now - Duration::days(1),
            None,
            now - Duration::days(10),
        );
        assert_eq!(q.status, QuotationStatus::Pending);
        assert_eq!(q.effective_status(now), QuotationStatus::Expired);
    }

    #[test]
    fn quotation_terminal_status_unaffected_by_expiry() {
        let now = Utc::now();
        let mut q = Quotation::new(
            "QT-002".into(),
            vec![LineItem::from_product(&product("1", 1000, true), 1)],
            TaxRate::from_bps(1650),
            now - Duration::days(1),
            None,
            now,
        );
        q.status = QuotationStatus::Converted;
        assert_eq!(q.effective_status(now), QuotationStatus::Converted);
        assert!(q.status.is_terminal());
    }
}
