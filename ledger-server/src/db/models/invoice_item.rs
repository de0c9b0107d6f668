//! Invoice Item Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One line of an invoice
///
/// Product attributes are snapshotted at sale time so later product
/// edits don't rewrite history. `buying_price` is carried on the line
/// for outer-product profit tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub invoice: RecordId,
    /// Record link to product; absent for outer-product lines
    pub product: Option<RecordId>,
    pub product_name: String,
    pub barcode: Option<String>,
    pub wattage: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity * unit_price
    pub total_price: f64,
    #[serde(default)]
    pub buying_price: f64,
    #[serde(default)]
    pub is_outer_product: bool,
    pub created_at: i64,
}
