//! Invoice Item Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::InvoiceItem;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ITEM_TABLE: &str = "invoice_item";

#[derive(Clone)]
pub struct InvoiceItemRepository {
    base: BaseRepository,
}

impl InvoiceItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, item: InvoiceItem) -> RepoResult<InvoiceItem> {
        let created: Option<InvoiceItem> = self.base.db().create(ITEM_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create invoice item".to_string()))
    }

    pub async fn list_by_invoice(&self, invoice: &RecordId) -> RepoResult<Vec<InvoiceItem>> {
        let items: Vec<InvoiceItem> = self
            .base
            .db()
            .query("SELECT * FROM invoice_item WHERE invoice = $invoice ORDER BY created_at ASC")
            .bind(("invoice", invoice.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Items belonging to any of the given invoices (aggregation scans)
    pub async fn list_by_invoice_ids(&self, ids: Vec<RecordId>) -> RepoResult<Vec<InvoiceItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<InvoiceItem> = self
            .base
            .db()
            .query("SELECT * FROM invoice_item WHERE invoice IN $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(items)
    }
}
