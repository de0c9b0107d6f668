//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product row
///
/// `remaining_amount` is the supplier-side due for this purchase line:
/// it starts at the line's buying total minus any advance applied at
/// purchase time, and only the supplier settlement walk decrements it.
/// It is a different ledger from the owning invoice's
/// `remaining_amount`; the two can legitimately diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Record link to supplier
    pub supplier: RecordId,
    pub shop_id: Option<String>,
    pub name: String,
    pub barcode: Option<String>,
    pub wattage: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub buying_price: f64,
    pub selling_price: f64,
    /// Units in stock; decremented by sales, restored by applied returns
    pub quantity: i64,
    #[serde(default)]
    pub advance_payment: f64,
    pub remaining_amount: f64,
    pub created_at: i64,
}
