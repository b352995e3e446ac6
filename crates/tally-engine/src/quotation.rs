//! # Quotation Service
//!
//! Creates, lists, and converts quotations.
//!
//! ## Lazy expiry
//! There is no background timer. Every read path resolves
//! `Pending` + past-validity to `Expired` before acting, and writes the
//! transition back through the store's conditional update so listings and
//! conversions agree on what "pending" means.
//!
//! ## Exactly-once conversion
//! The sale is built (pure, no side effects) first, then conversion claims
//! the quotation with a compare-and-set (`Pending -> Converted`), and only
//! then is the sale persisted. Two racing `convert` calls can both pass the
//! status read, but only one wins the CAS; the loser gets `NotConvertible`
//! and no second sale ever exists. If the sale then fails to persist
//! outright, the claim is rolled back best-effort so the quotation is not
//! stranded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use tally_core::{
    CartSnapshot, CoreError, PaymentMethod, Quotation, QuotationStatus, Sale, TaxRate,
};

use crate::checkout::{CheckoutOutcome, CheckoutProcessor};
use crate::error::{EngineError, EngineResult};
use crate::receipt;
use crate::store::{ProductStore, QuotationFilter, RecordStore, SaleNotifier};

/// Quotation workflow over the shared checkout commit path.
pub struct QuotationService<P, R, N> {
    records: Arc<R>,
    processor: Arc<CheckoutProcessor<P, R, N>>,
    tax_rate: TaxRate,
}

impl<P, R, N> QuotationService<P, R, N>
where
    P: ProductStore,
    R: RecordStore,
    N: SaleNotifier,
{
    pub fn new(
        records: Arc<R>,
        processor: Arc<CheckoutProcessor<P, R, N>>,
        tax_rate: TaxRate,
    ) -> Self {
        QuotationService {
            records,
            processor,
            tax_rate,
        }
    }

    /// Persists a new pending quotation from a cart snapshot.
    ///
    /// Totals are recomputed from the snapshot's items with the configured
    /// rate; a snapshot taken under a different rate does not smuggle its
    /// figures in.
    pub async fn create(
        &self,
        quotation_number: String,
        snapshot: CartSnapshot,
        valid_until: DateTime<Utc>,
        customer_id: Option<String>,
    ) -> EngineResult<Quotation> {
        // An empty quotation could never convert; reject it up front.
        if snapshot.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let quotation = Quotation::new(
            quotation_number,
            snapshot.items,
            self.tax_rate,
            valid_until,
            customer_id,
            Utc::now(),
        );
        self.records.create_quotation(&quotation).await?;

        info!(
            quotation = quotation.quotation_number.as_str(),
            total = %quotation.total,
            valid_until = %quotation.valid_until,
            "quotation created"
        );
        Ok(quotation)
    }

    /// Lists quotations with lazy expiry applied.
    ///
    /// Any pending quotation past its validity is returned as `Expired`,
    /// and the transition is written back so other readers see it too. A
    /// failed write-back only logs: the local view is already correct.
    pub async fn list(&self, filter: &QuotationFilter) -> EngineResult<Vec<Quotation>> {
        let now = Utc::now();

        // Status filtering happens here, after expiry resolution - a store
        // filtering on stored status would hide pending quotations that
        // should already read as expired.
        let store_filter = QuotationFilter {
            status: None,
            customer_id: filter.customer_id.clone(),
        };
        let mut quotations = self.records.list_quotations(&store_filter).await?;

        for quotation in &mut quotations {
            if quotation.status == QuotationStatus::Pending
                && quotation.effective_status(now) == QuotationStatus::Expired
            {
                self.mark_expired(quotation).await;
            }
        }

        // A status filter must see post-expiry statuses.
        if let Some(status) = filter.status {
            quotations.retain(|q| q.status == status);
        }

        Ok(quotations)
    }

    /// Converts a pending quotation into a committed sale.
    ///
    /// Fails with `NotConvertible` for any non-pending effective status:
    /// already converted, rejected, accepted elsewhere, or lazily expired.
    /// Totals are recomputed from the quotation's items - stored figures
    /// are display data, not input.
    pub async fn convert(
        &self,
        quotation_id: &str,
        method: PaymentMethod,
        staff_id: &str,
    ) -> EngineResult<CheckoutOutcome> {
        let quotation = self
            .records
            .get_quotation(quotation_id)
            .await?
            .ok_or_else(|| EngineError::QuotationNotFound {
                quotation_id: quotation_id.to_string(),
            })?;

        let now = Utc::now();
        let effective = quotation.effective_status(now);

        if effective != QuotationStatus::Pending {
            if quotation.status == QuotationStatus::Pending {
                // Lazily expired on this read; persist what we observed.
                let mut q = quotation.clone();
                self.mark_expired(&mut q).await;
            }
            return Err(CoreError::NotConvertible {
                quotation_number: quotation.quotation_number,
                status: effective,
            }
            .into());
        }

        // Same computation rules and commit path as a live checkout; the
        // conversion settles at exactly the recomputed total. Built before
        // the claim: construction is pure, so failing here leaves the
        // quotation untouched.
        let sale = Sale::paid_in_full(
            receipt::conversion_receipt_number(&quotation.quotation_number),
            quotation.items.clone(),
            self.tax_rate,
            method,
            staff_id.to_string(),
            quotation.customer_id.clone(),
            now,
        )?;

        // Claim before persisting the sale: the CAS is the only gate
        // against double conversion, so losing it must happen before any
        // sale exists in a store.
        let claimed = self
            .records
            .update_quotation_status(
                &quotation.id,
                QuotationStatus::Pending,
                QuotationStatus::Converted,
            )
            .await?;
        if !claimed {
            let status = self.refetch_status(&quotation.id).await;
            return Err(CoreError::NotConvertible {
                quotation_number: quotation.quotation_number,
                status,
            }
            .into());
        }

        debug!(
            quotation = quotation.quotation_number.as_str(),
            "quotation claimed for conversion"
        );

        let committed = self.processor.commit_sale(&sale).await;
        let (persistence, stock_failures) = match committed {
            Ok(outcome) => outcome,
            Err(err) => {
                // Hard store failure: release the claim so the quotation
                // can be converted once the backend recovers.
                let rolled_back = self
                    .records
                    .update_quotation_status(
                        &quotation.id,
                        QuotationStatus::Converted,
                        QuotationStatus::Pending,
                    )
                    .await
                    .unwrap_or(false);
                if !rolled_back {
                    warn!(
                        quotation = quotation.quotation_number.as_str(),
                        "failed to release conversion claim after persist failure"
                    );
                }
                return Err(err);
            }
        };

        info!(
            quotation = quotation.quotation_number.as_str(),
            receipt = sale.receipt_number(),
            total = %sale.total(),
            "quotation converted to sale"
        );

        Ok(CheckoutOutcome {
            sale,
            persistence,
            stock_failures,
        })
    }

    /// Writes a lazily-observed expiry back to the store and updates the
    /// local copy. Best-effort: losing the CAS just means another reader
    /// (or a converter) already resolved the status.
    async fn mark_expired(&self, quotation: &mut Quotation) {
        match self
            .records
            .update_quotation_status(
                &quotation.id,
                QuotationStatus::Pending,
                QuotationStatus::Expired,
            )
            .await
        {
            Ok(true) => {
                debug!(
                    quotation = quotation.quotation_number.as_str(),
                    "quotation expired"
                );
            }
            Ok(false) => {}
            Err(err) => {
                warn!(
                    quotation = quotation.quotation_number.as_str(),
                    error = %err,
                    "failed to persist quotation expiry"
                );
            }
        }
        quotation.status = QuotationStatus::Expired;
    }

    async fn refetch_status(&self, quotation_id: &str) -> QuotationStatus {
        match self.records.get_quotation(quotation_id).await {
            Ok(Some(q)) => q.status,
            // The claim was lost to a concurrent converter; report that.
            _ => QuotationStatus::Converted,
        }
    }
}
