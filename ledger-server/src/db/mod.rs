//! Database Module
//!
//! Embedded SurrealDB (RocksDB backend) plus idempotent schema setup.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "ledger";
const DATABASE: &str = "ledger";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and apply the schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB RocksDB)");

        Ok(Self { db })
    }
}

/// Apply idempotent table and index definitions
///
/// SCHEMALESS tables; the row shapes live in [`models`]. The unique
/// index on `invoice_number` backs the atomic numbering scheme.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS invoice SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS invoice_item SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS supplier_payment SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS product_return SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS return_item SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS customer SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS supplier SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS other_cost SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS salary_payment SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS system_state SCHEMALESS;

        DEFINE INDEX IF NOT EXISTS uniq_invoice_number ON TABLE invoice COLUMNS invoice_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_invoice_created ON TABLE invoice COLUMNS created_at;
        DEFINE INDEX IF NOT EXISTS idx_item_invoice ON TABLE invoice_item COLUMNS invoice;
        DEFINE INDEX IF NOT EXISTS idx_payment_invoice ON TABLE payment COLUMNS invoice;
        DEFINE INDEX IF NOT EXISTS idx_payment_date ON TABLE payment COLUMNS payment_date;
        DEFINE INDEX IF NOT EXISTS idx_sp_supplier ON TABLE supplier_payment COLUMNS supplier;
        DEFINE INDEX IF NOT EXISTS idx_product_supplier ON TABLE product COLUMNS supplier;
        DEFINE INDEX IF NOT EXISTS idx_return_invoice ON TABLE product_return COLUMNS invoice;
        DEFINE INDEX IF NOT EXISTS idx_return_item_return ON TABLE return_item COLUMNS product_return;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;

    Ok(())
}
