//! Repository Module
//!
//! Provides CRUD operations for the SurrealDB tables. Multi-statement
//! ledger transactions live in the `ledger` engine; repositories stay
//! single-purpose.

pub mod cost;
pub mod invoice;
pub mod invoice_item;
pub mod party;
pub mod payment;
pub mod product;
pub mod product_return;
pub mod supplier_payment;
pub mod system_state;

// Re-exports
pub use cost::CostRepository;
pub use invoice::InvoiceRepository;
pub use invoice_item::InvoiceItemRepository;
pub use party::{CustomerRepository, SupplierRepository};
pub use payment::PaymentRepository;
pub use product::ProductRepository;
pub use product_return::ProductReturnRepository;
pub use supplier_payment::SupplierPaymentRepository;
pub use system_state::SystemStateRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("already exists") || lower.contains("unique") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "invoice:abc".parse()?;
//   - 获取表名: id.table()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
