//! # Store Contracts
//!
//! Abstract contracts for the engine's external collaborators. The
//! contracts are behavioral, not wire-level: implementations may sit on
//! JSON-over-HTTP, a local database, or plain memory, as long as the
//! semantics below hold.
//!
//! ```text
//!   CheckoutProcessor ──► RecordStore    create_sale (may queue offline)
//!          │               ProductStore  decrement_stock (best effort)
//!          │               SaleNotifier  fire-and-forget
//!          ▼
//!   QuotationService  ──► RecordStore    conditional status update (CAS)
//! ```
//!
//! ## The conditional update
//! [`RecordStore::update_quotation_status`] is the engine's only atomicity
//! demand on a backend: compare-and-set on quotation status. A backend that
//! cannot offer it must fail the second concurrent update rather than apply
//! it blindly - `Ok(false)` is the "precondition failed" answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_core::{Customer, Product, Quotation, QuotationStatus, Sale};

use crate::CartSnapshot;

// =============================================================================
// Errors & Outcomes
// =============================================================================

/// Hard failures reported by a collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is reachable but refused the operation.
    #[error("store rejected operation: {0}")]
    Rejected(String),

    /// The backend could not be reached and has no offline queue.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Anything else the backend reports.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Convenience alias for Results with [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// How the Record Store landed a sale.
///
/// `QueuedOffline` means the sale sits in the store's local outbox and will
/// sync later. The sale is logically committed either way; the caller shows
/// a non-blocking "will sync when online" notice and keeps working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOutcome {
    Committed,
    QueuedOffline,
}

/// Listing filter for quotations.
#[derive(Debug, Clone, Default)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub customer_id: Option<String>,
}

// =============================================================================
// Contracts
// =============================================================================

/// Product catalog and stock bookkeeping.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, product_id: &str) -> StoreResult<Option<Product>>;

    async fn find_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>>;

    /// Reduces stock by `quantity`. May drive stock negative: the engine's
    /// decrement step is best-effort and the store is not asked to reserve.
    async fn decrement_stock(&self, product_id: &str, quantity: i64) -> StoreResult<()>;
}

/// Sales and quotations persistence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_sale(&self, sale: &Sale) -> StoreResult<PersistOutcome>;

    async fn create_quotation(&self, quotation: &Quotation) -> StoreResult<()>;

    async fn get_quotation(&self, quotation_id: &str) -> StoreResult<Option<Quotation>>;

    async fn list_quotations(&self, filter: &QuotationFilter) -> StoreResult<Vec<Quotation>>;

    /// Compare-and-set on quotation status. Returns `Ok(false)` when the
    /// stored status is not `expected`; the transition is not applied.
    async fn update_quotation_status(
        &self,
        quotation_id: &str,
        expected: QuotationStatus,
        next: QuotationStatus,
    ) -> StoreResult<bool>;
}

/// Customer directory, read-only from the engine's perspective.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Customer>>;
}

/// Receipt printer / customer display broadcaster.
///
/// Fire-and-forget: implementations swallow and log their own failures.
/// Nothing here may ever block or fail a checkout, which is why these
/// methods return nothing.
#[async_trait]
pub trait SaleNotifier: Send + Sync {
    /// A sale committed; print the receipt, flash the change due.
    async fn sale_completed(&self, sale: &Sale);

    /// Live cart state for a customer-facing display.
    async fn cart_changed(&self, snapshot: &CartSnapshot);
}
