//! Ledger Engine
//!
//! The invariant-bearing core: how invoice balances are derived, how
//! payments settle against them, how supplier dues are walked FIFO, how
//! returns are recorded and reconciled, and how the financial summary
//! is reduced from the stored rows.
//!
//! # 模块结构
//!
//! - [`money`] - f64 ⇄ Decimal 边界与货币舍入
//! - [`lifecycle`] - 发票派生状态 + 创建流程
//! - [`payments`] - 客户支付结算（单事务重算）
//! - [`supplier_due`] - 供应商欠款 FIFO 结算
//! - [`returns`] - 退货记录与台账核销
//! - [`finance`] - 财务汇总（纯 reduce）

pub mod finance;
pub mod lifecycle;
pub mod money;
pub mod payments;
pub mod returns;
pub mod supplier_due;

pub use finance::FinanceService;
pub use lifecycle::{InvoiceService, derive_status};
pub use payments::PaymentAllocator;
pub use returns::ReturnProcessor;
pub use supplier_due::{SupplierDueAllocator, fifo_allocate};

use surrealdb::RecordId;

use crate::utils::{AppError, AppResult};

/// Resolve a client-supplied id into a RecordId of the expected table
///
/// Accepts both the bare key and the full "table:key" form; a prefix
/// naming a different table is rejected. Keys that round-tripped
/// through Display keep working: the ⟨⟩ escaping is stripped.
pub(crate) fn parse_id(value: &str, table: &str) -> AppResult<RecordId> {
    let unescape = |key: &str| {
        key.trim_start_matches('⟨')
            .trim_end_matches('⟩')
            .trim_matches('`')
            .to_string()
    };

    match value.split_once(':') {
        Some((tb, key)) if tb == table && !key.is_empty() => {
            Ok(RecordId::from_table_key(table, unescape(key)))
        }
        None if !value.is_empty() => Ok(RecordId::from_table_key(table, unescape(value))),
        _ => Err(AppError::validation(format!(
            "Invalid {} id: {}",
            table, value
        ))),
    }
}

/// Same as [`parse_id`] for optional fields
pub(crate) fn parse_optional_id(
    value: &Option<String>,
    table: &str,
) -> AppResult<Option<RecordId>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_id(raw, table).map(Some),
    }
}

/// Map a transaction guard THROW to a conflict, anything else to a
/// database error
///
/// The Rust-side pre-checks produce the human-readable validation
/// errors; a guard firing means the state moved between the pre-check
/// and the commit.
pub(crate) fn guard_conflict(
    err: surrealdb::Error,
    guard_message: &str,
    conflict_message: &str,
) -> AppError {
    let msg = err.to_string();
    if msg.contains(guard_message) {
        AppError::Conflict(conflict_message.to_string())
    } else {
        AppError::Database(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_both_forms() {
        let from_key = parse_id("abc123", "invoice").unwrap();
        let from_full = parse_id("invoice:abc123", "invoice").unwrap();
        assert_eq!(from_key, from_full);
        assert_eq!(from_key.table(), "invoice");
    }

    #[test]
    fn test_parse_id_rejects_wrong_table() {
        assert!(parse_id("payment:abc", "invoice").is_err());
        assert!(parse_id("", "invoice").is_err());
        assert!(parse_id("invoice:", "invoice").is_err());
    }

    #[test]
    fn test_parse_id_strips_display_escaping() {
        let escaped = parse_id("invoice:⟨123abc⟩", "invoice").unwrap();
        let plain = parse_id("invoice:123abc", "invoice").unwrap();
        assert_eq!(escaped, plain);
    }
}
