//! # Tally Terminal
//!
//! Demo wiring of the checkout and quotation engine:
//!
//! ```text
//!   TerminalConfig (env) ──► CheckoutProcessor ──► in-memory stores
//!                            QuotationService      LoggingNotifier
//! ```
//!
//! Runs one scripted session - a cash sale with change, then a quotation
//! created and converted - and logs every step. Swap the memory stores for
//! real adapters and this file is the whole integration surface.

mod config;

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_core::{Cart, Customer, Money, Payment, PaymentMethod, Product};
use tally_engine::checkout::CheckoutProcessor;
use tally_engine::memory::{
    LoggingNotifier, MemoryCustomerStore, MemoryProductStore, MemoryRecordStore,
};
use tally_engine::quotation::QuotationService;
use tally_engine::store::CustomerStore;

use crate::config::TerminalConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TerminalConfig::load()?;
    info!(
        store = config.store_name.as_str(),
        staff = config.staff_id.as_str(),
        tax_rate = %config.tax_rate,
        "terminal starting"
    );

    let products = Arc::new(MemoryProductStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let customers = Arc::new(MemoryCustomerStore::new());
    let notifier = Arc::new(LoggingNotifier);
    seed_catalog(&products);
    customers.insert(Customer {
        id: "cust-001".into(),
        name: "Achieng Stores".into(),
        phone: Some("+254700000001".into()),
    });

    let processor = Arc::new(CheckoutProcessor::new(
        Arc::clone(&products),
        Arc::clone(&records),
        notifier,
        config.tax_rate,
    ));
    let quotations = QuotationService::new(
        Arc::clone(&records),
        Arc::clone(&processor),
        config.tax_rate,
    );

    // --- A cash sale with change -------------------------------------------
    let mut cart = Cart::new();
    processor.add_to_cart(&mut cart, "sugar-1kg", 2).await?;
    processor.scan_into_cart(&mut cart, "6161100110011", 1).await?;

    let outcome = processor
        .checkout(
            &mut cart,
            Payment::cash(Money::from_major(3000)),
            &config.staff_id,
            None,
        )
        .await?;
    info!(
        receipt = outcome.sale.receipt_number(),
        total = %outcome.sale.total(),
        change = %outcome.sale.change(),
        "sale complete"
    );

    // --- A quotation for a known customer, created then converted ----------
    let account = customers.list().await?.into_iter().next();
    let account_id = account.as_ref().map(|c| c.id.clone());

    let mut quote_cart = Cart::new();
    processor.add_to_cart(&mut quote_cart, "oil-2l", 3).await?;
    let snapshot = quote_cart.snapshot(config.tax_rate);

    let quotation = quotations
        .create(
            "QT-0001".to_string(),
            snapshot,
            Utc::now() + Duration::days(14),
            account_id,
        )
        .await?;

    let converted = quotations
        .convert(&quotation.id, PaymentMethod::MobileMoney, &config.staff_id)
        .await?;
    info!(
        receipt = converted.sale.receipt_number(),
        total = %converted.sale.total(),
        "quotation converted"
    );

    info!(
        sales = records.sales().len(),
        sugar_stock = products.stock_of("sugar-1kg").unwrap_or_default(),
        "session finished"
    );
    Ok(())
}

fn seed_catalog(products: &MemoryProductStore) {
    products.insert(Product {
        id: "sugar-1kg".into(),
        name: "Sugar 1kg".into(),
        sku: "SUG-1KG".into(),
        barcode: Some("6161100110028".into()),
        selling_price: Money::from_major(1000),
        cost_price: Money::from_major(700),
        stock_quantity: 40,
        taxable: true,
    });
    products.insert(Product {
        id: "bread-std".into(),
        name: "Bread Standard Loaf".into(),
        sku: "BRD-STD".into(),
        barcode: Some("6161100110011".into()),
        selling_price: Money::from_major(500),
        cost_price: Money::from_major(350),
        stock_quantity: 25,
        taxable: false,
    });
    products.insert(Product {
        id: "oil-2l".into(),
        name: "Cooking Oil 2L".into(),
        sku: "OIL-2L".into(),
        barcode: Some("6161100110035".into()),
        selling_price: Money::from_major(4500),
        cost_price: Money::from_major(3800),
        stock_quantity: 12,
        taxable: true,
    });
}
