//! System State Model (Singleton)

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Singleton row (`system_state:main`) holding the invoice counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub invoice_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
