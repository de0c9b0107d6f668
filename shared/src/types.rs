//! Core domain enums
//!
//! Stored as snake_case strings in the database; the SurrealQL in the
//! repository layer compares against the same literals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Invoice kind: a customer sale or a stock purchase from a supplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Sales,
    ProductAddition,
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "sales"),
            Self::ProductAddition => write!(f, "product_addition"),
        }
    }
}

/// Payment state of an invoice, derived from its settlement history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Pending,
    Processed,
    Rejected,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition of a returned item, as assessed at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    Used,
    Damaged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let s = serde_json::to_string(&InvoiceStatus::PartiallyPaid).unwrap();
        assert_eq!(s, "\"partially_paid\"");

        let back: InvoiceStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(back, InvoiceStatus::Paid);
    }

    #[test]
    fn test_invoice_type_wire_format() {
        let s = serde_json::to_string(&InvoiceType::ProductAddition).unwrap();
        assert_eq!(s, "\"product_addition\"");
        assert_eq!(InvoiceType::Sales.to_string(), "sales");
    }
}
