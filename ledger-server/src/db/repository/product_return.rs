//! Product Return Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::{ProductReturn, ReturnItem};
use shared::types::ReturnStatus;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProductReturnRepository {
    base: BaseRepository,
}

impl ProductReturnRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<ProductReturn>> {
        let ret: Option<ProductReturn> = self.base.db().select(id.clone()).await?;
        Ok(ret)
    }

    /// List returns, newest first, optionally by status
    pub async fn list(&self, status: Option<ReturnStatus>) -> RepoResult<Vec<ProductReturn>> {
        let sql = if status.is_some() {
            "SELECT * FROM product_return WHERE status = $status ORDER BY created_at DESC"
        } else {
            "SELECT * FROM product_return ORDER BY created_at DESC"
        };

        let mut query = self.base.db().query(sql);
        if let Some(s) = status {
            query = query.bind(("status", s));
        }

        let returns: Vec<ProductReturn> = query.await?.take(0)?;
        Ok(returns)
    }

    pub async fn list_by_invoice(&self, invoice: &RecordId) -> RepoResult<Vec<ProductReturn>> {
        let returns: Vec<ProductReturn> = self
            .base
            .db()
            .query("SELECT * FROM product_return WHERE invoice = $invoice ORDER BY created_at ASC")
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(returns)
    }

    pub async fn list_items(&self, product_return: &RecordId) -> RepoResult<Vec<ReturnItem>> {
        let items: Vec<ReturnItem> = self
            .base
            .db()
            .query("SELECT * FROM return_item WHERE product_return = $product_return")
            .bind(("product_return", product_return.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Sum of refunds already applied against one invoice
    ///
    /// Part of the authoritative settlement recompute: processed
    /// refunds count as settlement credits alongside payments.
    pub async fn sum_processed_refunds(&self, invoice: &RecordId) -> RepoResult<f64> {
        let sum: Option<f64> = self
            .base
            .db()
            .query("RETURN math::sum((SELECT VALUE refund_amount FROM product_return WHERE invoice = $invoice AND status = 'processed')) OR 0")
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(sum.unwrap_or(0.0))
    }

    /// Same as [`Self::sum_processed_refunds`] over many invoices
    pub async fn sum_processed_refunds_for_invoices(
        &self,
        ids: Vec<RecordId>,
    ) -> RepoResult<f64> {
        if ids.is_empty() {
            return Ok(0.0);
        }
        let sum: Option<f64> = self
            .base
            .db()
            .query("RETURN math::sum((SELECT VALUE refund_amount FROM product_return WHERE invoice IN $ids AND status = 'processed')) OR 0")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(sum.unwrap_or(0.0))
    }
}
