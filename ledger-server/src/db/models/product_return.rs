//! Product Return Models

use serde::{Deserialize, Serialize};
use shared::types::{ItemCondition, ReturnStatus};
use surrealdb::RecordId;

/// Return request header
///
/// Recording a return does not touch the invoice or product rows; the
/// explicit apply step reconciles it against the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReturn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub invoice: RecordId,
    pub customer: Option<RecordId>,
    /// Σ return_item.total_price at creation
    pub total_amount: f64,
    pub refund_amount: f64,
    pub status: ReturnStatus,
    pub return_reason: String,
    pub notes: Option<String>,
    pub created_at: i64,
    /// Set when the return leaves `pending`
    pub processed_at: Option<i64>,
}

/// One returned line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub product_return: RecordId,
    pub product: Option<RecordId>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub condition: ItemCondition,
}
