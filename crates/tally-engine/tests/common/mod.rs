//! Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use tally_core::{Money, Product, TaxRate};
use tally_engine::checkout::CheckoutProcessor;
use tally_engine::memory::{LoggingNotifier, MemoryProductStore, MemoryRecordStore};
use tally_engine::quotation::QuotationService;

/// 16.5% - the rate the demo store trades under. Injected everywhere;
/// individual tests override it where the scenario calls for another rate.
pub const TEST_RATE_BPS: u32 = 1650;

pub struct Harness {
    pub products: Arc<MemoryProductStore>,
    pub records: Arc<MemoryRecordStore>,
    pub processor: Arc<CheckoutProcessor<MemoryProductStore, MemoryRecordStore, LoggingNotifier>>,
    pub quotations:
        QuotationService<MemoryProductStore, MemoryRecordStore, LoggingNotifier>,
}

pub fn harness() -> Harness {
    let products = Arc::new(MemoryProductStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let notifier = Arc::new(LoggingNotifier);
    let rate = TaxRate::from_bps(TEST_RATE_BPS);

    products.insert(product("sugar", "SUG-1KG", 1000, true, 50));
    products.insert(product("bread", "BRD-STD", 500, false, 20));

    let processor = Arc::new(CheckoutProcessor::new(
        Arc::clone(&products),
        Arc::clone(&records),
        notifier,
        rate,
    ));
    let quotations = QuotationService::new(Arc::clone(&records), Arc::clone(&processor), rate);

    Harness {
        products,
        records,
        processor,
        quotations,
    }
}

/// Builds a product priced in whole currency units.
pub fn product(id: &str, sku: &str, price_major: i64, taxable: bool, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("{sku} ({id})"),
        sku: sku.to_string(),
        barcode: Some(format!("bar-{id}")),
        selling_price: Money::from_major(price_major),
        cost_price: Money::from_major(price_major / 2),
        stock_quantity: stock,
        taxable,
    }
}
