//! # In-Memory Collaborators
//!
//! In-process implementations of the store contracts, used by the engine's
//! integration tests and the demo terminal. These are stand-ins for real
//! backends, not a persistence engine: state lives in mutex-guarded maps
//! and dies with the process.
//!
//! Fault injection hooks ([`MemoryRecordStore::set_offline`],
//! [`MemoryProductStore::fail_decrement_for`]) exist so the queued-offline
//! and partial-decrement paths can be exercised deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::{CartSnapshot, Customer, Product, Quotation, QuotationStatus, Sale};

use crate::store::{
    CustomerStore, PersistOutcome, ProductStore, QuotationFilter, RecordStore, SaleNotifier,
    StoreError, StoreResult,
};

// =============================================================================
// Product Store
// =============================================================================

/// Product catalog backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<HashMap<String, Product>>,
    failing_decrements: Mutex<HashSet<String>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products
            .lock()
            .expect("product store poisoned")
            .insert(product.id.clone(), product);
    }

    /// Current stock for a product, for test assertions.
    pub fn stock_of(&self, product_id: &str) -> Option<i64> {
        self.products
            .lock()
            .expect("product store poisoned")
            .get(product_id)
            .map(|p| p.stock_quantity)
    }

    /// Makes every decrement for `product_id` fail until cleared.
    pub fn fail_decrement_for(&self, product_id: &str, failing: bool) {
        let mut set = self
            .failing_decrements
            .lock()
            .expect("product store poisoned");
        if failing {
            set.insert(product_id.to_string());
        } else {
            set.remove(product_id);
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn get(&self, product_id: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .expect("product store poisoned")
            .get(product_id)
            .cloned())
    }

    async fn find_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .expect("product store poisoned")
            .values()
            .find(|p| p.barcode.as_deref() == Some(barcode))
            .cloned())
    }

    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> StoreResult<()> {
        if self
            .failing_decrements
            .lock()
            .expect("product store poisoned")
            .contains(product_id)
        {
            return Err(StoreError::Backend(format!(
                "injected decrement failure for {product_id}"
            )));
        }

        let mut products = self.products.lock().expect("product store poisoned");
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::Rejected(format!("no such product: {product_id}")))?;

        // May go negative: best-effort policy, no reservation.
        product.stock_quantity -= quantity;
        Ok(())
    }
}

// =============================================================================
// Record Store
// =============================================================================

/// A sale parked for later sync, serialized the way a real backend's
/// outbox would hold it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub entity_id: String,
    /// Full sale as JSON.
    pub payload: String,
    pub queued_at: DateTime<Utc>,
}

/// Sales and quotations in memory.
///
/// The quotation map sits behind one mutex, which is what makes
/// `update_quotation_status` a genuine compare-and-set: the read and the
/// write happen inside a single critical section.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    sales: Mutex<Vec<Sale>>,
    outbox: Mutex<Vec<OutboxEntry>>,
    quotations: Mutex<HashMap<String, Quotation>>,
    offline: AtomicBool,
    failing_sales: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, `create_sale` answers `QueuedOffline` and parks the
    /// sale in a local outbox instead of the committed list.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes `create_sale` fail outright - a backend with no offline
    /// queue, distinct from [`set_offline`](Self::set_offline).
    pub fn set_sale_failure(&self, failing: bool) {
        self.failing_sales.store(failing, Ordering::SeqCst);
    }

    /// Committed sales, for assertions.
    pub fn sales(&self) -> Vec<Sale> {
        self.sales.lock().expect("record store poisoned").clone()
    }

    /// Sales parked while offline, for assertions.
    pub fn outbox(&self) -> Vec<OutboxEntry> {
        self.outbox.lock().expect("record store poisoned").clone()
    }

    /// Total number of sales the store has accepted, committed or queued.
    pub fn sale_count(&self) -> usize {
        self.sales.lock().expect("record store poisoned").len()
            + self.outbox.lock().expect("record store poisoned").len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_sale(&self, sale: &Sale) -> StoreResult<PersistOutcome> {
        if self.failing_sales.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected sale persistence failure".to_string(),
            ));
        }
        if self.offline.load(Ordering::SeqCst) {
            let payload = serde_json::to_string(sale)
                .map_err(|e| StoreError::Backend(format!("serialize sale: {e}")))?;
            self.outbox
                .lock()
                .expect("record store poisoned")
                .push(OutboxEntry {
                    entity_id: sale.id().to_string(),
                    payload,
                    queued_at: Utc::now(),
                });
            return Ok(PersistOutcome::QueuedOffline);
        }

        self.sales
            .lock()
            .expect("record store poisoned")
            .push(sale.clone());
        Ok(PersistOutcome::Committed)
    }

    async fn create_quotation(&self, quotation: &Quotation) -> StoreResult<()> {
        self.quotations
            .lock()
            .expect("record store poisoned")
            .insert(quotation.id.clone(), quotation.clone());
        Ok(())
    }

    async fn get_quotation(&self, quotation_id: &str) -> StoreResult<Option<Quotation>> {
        Ok(self
            .quotations
            .lock()
            .expect("record store poisoned")
            .get(quotation_id)
            .cloned())
    }

    async fn list_quotations(&self, filter: &QuotationFilter) -> StoreResult<Vec<Quotation>> {
        let quotations = self.quotations.lock().expect("record store poisoned");
        let mut out: Vec<Quotation> = quotations
            .values()
            .filter(|q| match &filter.customer_id {
                Some(customer) => q.customer_id.as_deref() == Some(customer.as_str()),
                None => true,
            })
            .filter(|q| match filter.status {
                Some(status) => q.status == status,
                None => true,
            })
            .cloned()
            .collect();
        // Stable listing order for screens and tests.
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn update_quotation_status(
        &self,
        quotation_id: &str,
        expected: QuotationStatus,
        next: QuotationStatus,
    ) -> StoreResult<bool> {
        let mut quotations = self.quotations.lock().expect("record store poisoned");
        match quotations.get_mut(quotation_id) {
            Some(q) if q.status == expected => {
                q.status = next;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::Rejected(format!(
                "no such quotation: {quotation_id}"
            ))),
        }
    }
}

// =============================================================================
// Customer Store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    customers: Mutex<Vec<Customer>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) {
        self.customers
            .lock()
            .expect("customer store poisoned")
            .push(customer);
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn list(&self) -> StoreResult<Vec<Customer>> {
        Ok(self
            .customers
            .lock()
            .expect("customer store poisoned")
            .clone())
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Notifier that logs instead of printing. Stands in for the receipt
/// printer and customer display; like them, it can never fail a checkout.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl SaleNotifier for LoggingNotifier {
    async fn sale_completed(&self, sale: &Sale) {
        info!(
            receipt = sale.receipt_number(),
            total = %sale.total(),
            change = %sale.change(),
            "receipt: sale completed"
        );
    }

    async fn cart_changed(&self, snapshot: &CartSnapshot) {
        info!(
            lines = snapshot.items.len(),
            total = %snapshot.totals.total,
            "display: cart updated"
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
