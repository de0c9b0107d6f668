//! Shared test fixtures: throwaway database + row builders

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use ledger_server::db::DbService;
use ledger_server::db::models::{CustomerCreate, SupplierCreate};
use ledger_server::db::repository::{CustomerRepository, SupplierRepository};
use ledger_server::ledger::lifecycle::{CreateInvoiceInput, InvoiceItemInput};
use shared::types::InvoiceType;

/// Open a fresh RocksDB-backed database in a tempdir
///
/// The TempDir must stay alive for the duration of the test.
pub async fn test_db() -> (TempDir, Surreal<Db>) {
    let dir = tempfile::tempdir().expect("Failed to create tempdir");
    let path = dir.path().join("test.db");
    let service = DbService::new(&path.to_string_lossy())
        .await
        .expect("Failed to open test database");
    (dir, service.db)
}

pub async fn seed_customer(db: &Surreal<Db>, name: &str) -> surrealdb::RecordId {
    let customer = CustomerRepository::new(db.clone())
        .create(CustomerCreate {
            name: name.to_string(),
            phone: None,
            address: None,
        })
        .await
        .expect("Failed to seed customer");
    customer.id.expect("customer id")
}

pub async fn seed_supplier(db: &Surreal<Db>, name: &str) -> surrealdb::RecordId {
    let supplier = SupplierRepository::new(db.clone())
        .create(SupplierCreate {
            name: name.to_string(),
            phone: None,
            address: None,
        })
        .await
        .expect("Failed to seed supplier");
    supplier.id.expect("supplier id")
}

/// A plain sales line, optionally linked to a tracked product
pub fn sales_item(name: &str, quantity: i64, unit_price: f64, product: Option<String>) -> InvoiceItemInput {
    InvoiceItemInput {
        product,
        product_name: name.to_string(),
        barcode: None,
        wattage: None,
        size: None,
        color: None,
        quantity,
        unit_price,
        buying_price: 0.0,
        selling_price: None,
        is_outer_product: false,
    }
}

/// A purchase line for a product-addition invoice
pub fn purchase_item(name: &str, quantity: i64, buying_price: f64, selling_price: f64) -> InvoiceItemInput {
    InvoiceItemInput {
        product: None,
        product_name: name.to_string(),
        barcode: None,
        wattage: None,
        size: None,
        color: None,
        quantity,
        unit_price: buying_price,
        buying_price,
        selling_price: Some(selling_price),
        is_outer_product: false,
    }
}

pub fn sales_invoice(
    customer: Option<String>,
    advance: f64,
    items: Vec<InvoiceItemInput>,
) -> CreateInvoiceInput {
    CreateInvoiceInput {
        invoice_type: InvoiceType::Sales,
        customer,
        supplier: None,
        shop_id: None,
        advance_payment: advance,
        discount_amount: 0.0,
        notes: None,
        items,
    }
}

pub fn purchase_invoice(
    supplier: String,
    advance: f64,
    items: Vec<InvoiceItemInput>,
) -> CreateInvoiceInput {
    CreateInvoiceInput {
        invoice_type: InvoiceType::ProductAddition,
        customer: None,
        supplier: Some(supplier),
        shop_id: None,
        advance_payment: advance,
        discount_amount: 0.0,
        notes: None,
        items,
    }
}
