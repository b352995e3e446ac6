//! # Checkout Processor
//!
//! Drives one transaction attempt through its states:
//!
//! ```text
//!   Idle ──► Validating ──► Persisting ──► Decrementing ──► Done
//!              │                │
//!              └──► Failed ◄────┘   (validation / hard store failure)
//! ```
//!
//! ## Commit point
//! The sale is logically committed the moment the Record Store accepts it
//! (`Committed` or `QueuedOffline`). Everything after - stock decrement,
//! receipt printing - is best-effort bookkeeping and never rolls the sale
//! back.
//!
//! ## Serialization
//! One cart, one checkout at a time: a `try_lock` on an internal mutex
//! rejects a second concurrent attempt with `CheckoutInProgress` while one
//! is past Validating. No distributed lock - the cart is not shared across
//! processes.
//!
//! ## Stock decrement idempotency
//! Completed decrements are tracked per `(sale, product)` in a ledger, so
//! retrying after a partial failure never double-decrements a line that
//! already succeeded. Completion is tracked, not re-derived from the Sale.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tally_core::{
    validation, Cart, CartSnapshot, Payment, Sale, TaxRate,
};

use crate::error::{EngineError, EngineResult};
use crate::receipt;
use crate::store::{PersistOutcome, ProductStore, RecordStore, SaleNotifier};

/// One line whose stock decrement failed.
///
/// Reported, never fatal: the sale is already committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFailure {
    pub product_id: String,
    pub sku: String,
    pub quantity: i64,
    pub reason: String,
}

/// What a completed checkout (or conversion) hands back.
#[derive(Debug)]
pub struct CheckoutOutcome {
    /// The immutable committed sale.
    pub sale: Sale,

    /// Whether the Record Store committed directly or queued for sync.
    pub persistence: PersistOutcome,

    /// Lines whose stock decrement failed; retry with
    /// [`CheckoutProcessor::retry_decrements`].
    pub stock_failures: Vec<StockFailure>,
}

impl CheckoutOutcome {
    /// True when stock bookkeeping is lagging behind the committed sale.
    pub fn has_stock_failures(&self) -> bool {
        !self.stock_failures.is_empty()
    }
}

/// The per-terminal checkout engine.
///
/// Owns no cart; carts are passed in by the session that owns them.
pub struct CheckoutProcessor<P, R, N> {
    products: Arc<P>,
    records: Arc<R>,
    notifier: Arc<N>,
    tax_rate: TaxRate,

    /// Serializes checkout attempts for the cart this processor serves.
    in_progress: Mutex<()>,

    /// Completed stock decrements, keyed by (sale id, product id).
    decrement_ledger: StdMutex<HashSet<(String, String)>>,
}

impl<P, R, N> CheckoutProcessor<P, R, N>
where
    P: ProductStore,
    R: RecordStore,
    N: SaleNotifier,
{
    pub fn new(products: Arc<P>, records: Arc<R>, notifier: Arc<N>, tax_rate: TaxRate) -> Self {
        CheckoutProcessor {
            products,
            records,
            notifier,
            tax_rate,
            in_progress: Mutex::new(()),
            decrement_ledger: StdMutex::new(HashSet::new()),
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Adds a product to the cart after a live stock check.
    ///
    /// Stock is read from the Product Store at call time, never cached:
    /// a product at zero or negative stock is rejected with `OutOfStock`.
    pub async fn add_to_cart(
        &self,
        cart: &mut Cart,
        product_id: &str,
        quantity: i64,
    ) -> EngineResult<CartSnapshot> {
        validation::validate_quantity(quantity).map_err(tally_core::CoreError::from)?;

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| EngineError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        if product.stock_quantity <= 0 {
            return Err(tally_core::CoreError::OutOfStock {
                sku: product.sku,
                available: product.stock_quantity,
                requested: quantity,
            }
            .into());
        }

        cart.add_product(&product, quantity)?;
        debug!(product_id, quantity, lines = cart.line_count(), "added to cart");

        Ok(self.broadcast_cart(cart).await)
    }

    /// Barcode path: resolve the product, then the same live stock check.
    pub async fn scan_into_cart(
        &self,
        cart: &mut Cart,
        barcode: &str,
        quantity: i64,
    ) -> EngineResult<CartSnapshot> {
        let product = self
            .products
            .find_by_barcode(barcode)
            .await?
            .ok_or_else(|| EngineError::BarcodeNotFound {
                barcode: barcode.to_string(),
            })?;

        self.add_to_cart(cart, &product.id, quantity).await
    }

    /// Pushes the live cart state to the customer display. Fire-and-forget.
    pub async fn broadcast_cart(&self, cart: &Cart) -> CartSnapshot {
        let snapshot = cart.snapshot(self.tax_rate);
        self.notifier.cart_changed(&snapshot).await;
        snapshot
    }

    /// Runs a full checkout attempt for the given cart and payment.
    ///
    /// On success the cart is cleared and the committed sale returned along
    /// with persistence/decrement bookkeeping. On any error the cart is
    /// untouched and no partial state exists anywhere.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        payment: Payment,
        staff_id: &str,
        customer_id: Option<String>,
    ) -> EngineResult<CheckoutOutcome> {
        // One attempt past Validating at a time.
        let _guard = self
            .in_progress
            .try_lock()
            .map_err(|_| EngineError::CheckoutInProgress)?;

        debug!(staff_id, method = ?payment.method, "checkout: validating");

        // Validating: Sale construction recomputes totals from the line
        // snapshots and rejects empty carts and short cash tenders. No
        // state has changed if this fails.
        let snapshot = cart.snapshot(self.tax_rate);

        // A fully discounted sale totals zero and closes with zero cash;
        // anything owed needs a positive tender.
        if payment.method.is_cash() && !snapshot.totals.total.is_zero() {
            validation::validate_tendered(payment.tendered)
                .map_err(tally_core::CoreError::from)?;
        }
        let sale = Sale::from_checkout(
            receipt::generate_receipt_number(),
            snapshot.items,
            self.tax_rate,
            payment,
            staff_id.to_string(),
            customer_id,
            Utc::now(),
        )?;

        let (persistence, stock_failures) = self.commit_sale(&sale).await?;

        // Done: the working set resets for the next customer.
        cart.clear();
        self.broadcast_cart(cart).await;

        info!(
            receipt = sale.receipt_number(),
            total = %sale.total(),
            change = %sale.change(),
            persistence = ?persistence,
            "checkout complete"
        );

        Ok(CheckoutOutcome {
            sale,
            persistence,
            stock_failures,
        })
    }

    /// Persisting + Decrementing + notification, shared by live checkout
    /// and quotation conversion.
    pub(crate) async fn commit_sale(
        &self,
        sale: &Sale,
    ) -> EngineResult<(PersistOutcome, Vec<StockFailure>)> {
        debug!(receipt = sale.receipt_number(), "checkout: persisting");

        let persistence = self.records.create_sale(sale).await?;
        if persistence == PersistOutcome::QueuedOffline {
            // Logically committed; the store's outbox owns remote delivery.
            warn!(receipt = sale.receipt_number(), "sale queued offline, will sync later");
        }

        debug!(receipt = sale.receipt_number(), "checkout: decrementing stock");
        let stock_failures = self.decrement_lines(sale).await;

        self.notifier.sale_completed(sale).await;

        Ok((persistence, stock_failures))
    }

    /// Replays stock decrements for a committed sale.
    ///
    /// Safe to call any number of times: lines the ledger already marked
    /// complete are skipped, so a retry never double-decrements.
    pub async fn retry_decrements(&self, sale: &Sale) -> Vec<StockFailure> {
        self.decrement_lines(sale).await
    }

    async fn decrement_lines(&self, sale: &Sale) -> Vec<StockFailure> {
        let mut failures = Vec::new();

        for line in sale.items() {
            let key = (sale.id().to_string(), line.product_id.clone());
            let already_done = {
                let ledger = self.decrement_ledger.lock().expect("ledger mutex poisoned");
                ledger.contains(&key)
            };
            if already_done {
                continue;
            }

            match self
                .products
                .decrement_stock(&line.product_id, line.quantity)
                .await
            {
                Ok(()) => {
                    let mut ledger =
                        self.decrement_ledger.lock().expect("ledger mutex poisoned");
                    ledger.insert(key);
                }
                Err(err) => {
                    // Best effort per line: report and keep going. The sale
                    // is committed; stock bookkeeping may lag.
                    warn!(
                        sku = line.sku.as_str(),
                        product_id = line.product_id.as_str(),
                        quantity = line.quantity,
                        error = %err,
                        "stock decrement failed"
                    );
                    failures.push(StockFailure {
                        product_id: line.product_id.clone(),
                        sku: line.sku.clone(),
                        quantity: line.quantity,
                        reason: err.to_string(),
                    });
                }
            }
        }

        failures
    }
}
