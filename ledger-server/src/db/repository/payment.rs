//! Payment Repository
//!
//! 只读查询。payment 行的写入只发生在 PaymentAllocator 的
//! 结算事务里，保持 append-only。

use super::{BaseRepository, RepoResult};
use crate::db::models::Payment;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Payment>> {
        let payment: Option<Payment> = self.base.db().select(id.clone()).await?;
        Ok(payment)
    }

    /// 按发票查询支付记录
    pub async fn list_by_invoice(&self, invoice: &RecordId) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE invoice = $invoice ORDER BY payment_date ASC")
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(payments)
    }

    /// Authoritative payment sum for one invoice
    pub async fn sum_for_invoice(&self, invoice: &RecordId) -> RepoResult<f64> {
        let sum: Option<f64> = self
            .base
            .db()
            .query("RETURN math::sum((SELECT VALUE amount FROM payment WHERE invoice = $invoice)) OR 0")
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(sum.unwrap_or(0.0))
    }

    /// Payment sum across many invoices (customer balance)
    pub async fn sum_for_invoices(&self, ids: Vec<RecordId>) -> RepoResult<f64> {
        if ids.is_empty() {
            return Ok(0.0);
        }
        let sum: Option<f64> = self
            .base
            .db()
            .query("RETURN math::sum((SELECT VALUE amount FROM payment WHERE invoice IN $ids)) OR 0")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(sum.unwrap_or(0.0))
    }

    /// 按时间范围查询（统计用），`[from, to)`
    pub async fn list_between(&self, from: i64, to: i64) -> RepoResult<Vec<Payment>> {
        let payments: Vec<Payment> = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE payment_date >= $from AND payment_date < $to ORDER BY payment_date ASC")
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(payments)
    }
}
