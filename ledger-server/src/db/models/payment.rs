//! Payment Model
//!
//! 客户支付记录，append-only：没有 update/delete 路径。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub invoice: RecordId,
    pub amount: f64,
    pub payment_method: String,
    /// Unix millis of the payment itself (may differ from created_at)
    pub payment_date: i64,
    pub notes: Option<String>,
    pub created_at: i64,
}
