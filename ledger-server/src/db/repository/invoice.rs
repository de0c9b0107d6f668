//! Invoice Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Invoice;
use shared::types::{InvoiceStatus, InvoiceType};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const INVOICE_TABLE: &str = "invoice";

#[derive(Clone)]
pub struct InvoiceRepository {
    base: BaseRepository,
}

impl InvoiceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, invoice: Invoice) -> RepoResult<Invoice> {
        let created: Option<Invoice> = self
            .base
            .db()
            .create(INVOICE_TABLE)
            .content(invoice)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create invoice".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Invoice>> {
        let invoice: Option<Invoice> = self.base.db().select(id.clone()).await?;
        Ok(invoice)
    }

    /// List invoices, newest first, optionally filtered by type/status
    pub async fn list(
        &self,
        invoice_type: Option<InvoiceType>,
        status: Option<InvoiceStatus>,
    ) -> RepoResult<Vec<Invoice>> {
        let mut conditions: Vec<&str> = Vec::new();
        if invoice_type.is_some() {
            conditions.push("invoice_type = $invoice_type");
        }
        if status.is_some() {
            conditions.push("status = $status");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT * FROM invoice{} ORDER BY created_at DESC",
            where_clause
        );

        let mut query = self.base.db().query(sql);
        if let Some(t) = invoice_type {
            query = query.bind(("invoice_type", t));
        }
        if let Some(s) = status {
            query = query.bind(("status", s));
        }

        let invoices: Vec<Invoice> = query.await?.take(0)?;
        Ok(invoices)
    }

    /// Invoices created within `[from, to)`, optionally per shop
    pub async fn list_created_between(
        &self,
        from: i64,
        to: i64,
        shop_id: Option<String>,
    ) -> RepoResult<Vec<Invoice>> {
        let sql = if shop_id.is_some() {
            "SELECT * FROM invoice WHERE created_at >= $from AND created_at < $to AND shop_id = $shop_id ORDER BY created_at ASC"
        } else {
            "SELECT * FROM invoice WHERE created_at >= $from AND created_at < $to ORDER BY created_at ASC"
        };

        let mut query = self.base.db().query(sql).bind(("from", from)).bind(("to", to));
        if let Some(shop) = shop_id {
            query = query.bind(("shop_id", shop));
        }

        let invoices: Vec<Invoice> = query.await?.take(0)?;
        Ok(invoices)
    }

    pub async fn find_by_ids(&self, ids: Vec<RecordId>) -> RepoResult<Vec<Invoice>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let invoices: Vec<Invoice> = self
            .base
            .db()
            .query("SELECT * FROM invoice WHERE id IN $ids")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(invoices)
    }

    /// Non-paid invoices of one type, optionally per shop (credit views)
    pub async fn list_unpaid(
        &self,
        invoice_type: InvoiceType,
        shop_id: Option<String>,
    ) -> RepoResult<Vec<Invoice>> {
        let sql = if shop_id.is_some() {
            "SELECT * FROM invoice WHERE invoice_type = $invoice_type AND status != 'paid' AND shop_id = $shop_id"
        } else {
            "SELECT * FROM invoice WHERE invoice_type = $invoice_type AND status != 'paid'"
        };

        let mut query = self.base.db().query(sql).bind(("invoice_type", invoice_type));
        if let Some(shop) = shop_id {
            query = query.bind(("shop_id", shop));
        }

        let invoices: Vec<Invoice> = query.await?.take(0)?;
        Ok(invoices)
    }

    /// All sales invoices of one customer (balance computation)
    pub async fn list_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Invoice>> {
        let invoices: Vec<Invoice> = self
            .base
            .db()
            .query("SELECT * FROM invoice WHERE customer = $customer ORDER BY created_at ASC")
            .bind(("customer", customer.clone()))
            .await?
            .take(0)?;
        Ok(invoices)
    }
}
