//! Invoice Model

use serde::{Deserialize, Serialize};
use shared::types::{InvoiceStatus, InvoiceType};
use surrealdb::RecordId;

/// Invoice row
///
/// `remaining_amount` and `status` are derived columns, recomputed from
/// the authoritative settlement history (advance + payments + applied
/// refunds) on every mutation. They are stored so list views don't need
/// a join per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Human-readable number, e.g. "INV2026020510001"
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub total_amount: f64,
    #[serde(default)]
    pub advance_payment: f64,
    /// First-class discount field; the gross item total minus this is
    /// `total_amount`. Absence means zero.
    #[serde(default)]
    pub discount_amount: f64,
    pub remaining_amount: f64,
    pub status: InvoiceStatus,
    /// Record link to customer (sales invoices)
    pub customer: Option<RecordId>,
    /// Record link to supplier (product-addition invoices)
    pub supplier: Option<RecordId>,
    pub shop_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
