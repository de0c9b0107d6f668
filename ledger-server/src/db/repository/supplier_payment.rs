//! Supplier Payment Repository
//!
//! 只读查询；写入只发生在 SupplierDueAllocator 的结算事务里。

use super::{BaseRepository, RepoResult};
use crate::db::models::SupplierPayment;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct SupplierPaymentRepository {
    base: BaseRepository,
}

impl SupplierPaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn list_by_supplier(&self, supplier: &RecordId) -> RepoResult<Vec<SupplierPayment>> {
        let payments: Vec<SupplierPayment> = self
            .base
            .db()
            .query("SELECT * FROM supplier_payment WHERE supplier = $supplier ORDER BY payment_date ASC")
            .bind(("supplier", supplier.clone()))
            .await?
            .take(0)?;
        Ok(payments)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<SupplierPayment>> {
        let payment: Option<SupplierPayment> = self.base.db().select(id.clone()).await?;
        Ok(payment)
    }
}
