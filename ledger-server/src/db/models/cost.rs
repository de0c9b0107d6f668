//! Expense Feed Models
//!
//! Consumed read-only by the financial aggregator.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherCost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub amount: f64,
    pub category: String,
    pub cost_date: i64,
    pub notes: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub employee_name: String,
    pub amount: f64,
    pub payment_date: i64,
    pub created_at: i64,
}
