//! # tally-engine: Checkout & Quotation Engine
//!
//! The stateful half of Tally POS: two small state machines over the pure
//! arithmetic in `tally-core`, speaking to external collaborators through
//! trait contracts.
//!
//! ```text
//!   UI event ──► Cart mutation ──► totals recompute (pure, idempotent)
//!                                        │
//!                       checkout         ▼
//!   CheckoutProcessor:  Validating ─► Persisting ─► Decrementing ─► Done
//!                            │            │ RecordStore (may queue offline)
//!                            │            │ ProductStore (best-effort)
//!                            │            └ SaleNotifier (fire-and-forget)
//!                            ▼
//!                         Failed (cart untouched)
//!
//!   QuotationService:   Pending ──CAS──► Converted   (shared commit path)
//!                       Pending ──lazy─► Expired     (check-on-read)
//! ```
//!
//! ## Modules
//! - [`store`] - collaborator contracts (Product/Record/Customer stores,
//!   notifier) and the persist outcome model
//! - [`checkout`] - the checkout processor and decrement ledger
//! - [`quotation`] - quotation creation, listing with lazy expiry,
//!   CAS-guarded conversion
//! - [`receipt`] - receipt numbering
//! - [`memory`] - in-process store implementations for tests and demos

pub mod checkout;
pub mod error;
pub mod memory;
pub mod quotation;
pub mod receipt;
pub mod store;

pub use checkout::{CheckoutOutcome, CheckoutProcessor, StockFailure};
pub use error::{EngineError, EngineResult};
pub use quotation::QuotationService;
pub use store::{PersistOutcome, QuotationFilter, StoreError, StoreResult};

// Re-exported so engine callers need a single import path for the common
// working set.
pub use tally_core::{Cart, CartSnapshot, Money, Payment, PaymentMethod, TaxRate};
