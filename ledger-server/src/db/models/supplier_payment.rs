//! Supplier Payment Model
//!
//! 供应商付款记录，append-only。付款属于供应商整体欠款，
//! 不挂在任何一张发票上 — 结算发生在 product 行的 remaining_amount 上。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub supplier: RecordId,
    pub amount: f64,
    pub payment_method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub payment_date: i64,
    pub created_at: i64,
}
