//! Supplier Due Settlement
//!
//! A supplier payment is recorded once against the supplier and then
//! walked across that supplier's outstanding product lines
//! oldest-created-first: greedy FIFO, never proportional. The oldest
//! line is cleared (or partially reduced) before the next is touched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Product, SupplierPayment};
use crate::db::repository::{ProductRepository, SupplierPaymentRepository, SupplierRepository};
use crate::ledger::money::{exceeds, round_amount, sum_amounts, to_decimal, to_f64};
use crate::ledger::{guard_conflict, parse_id};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_REFERENCE_LEN, validate_optional_text, validate_positive_amount,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Plan a FIFO settlement: how much of `budget` lands on each due,
/// in order
///
/// Walks the dues front to back applying `min(budget_left, due)`;
/// later lines get zero once the budget is exhausted. The caller is
/// responsible for passing dues in oldest-first order.
pub fn fifo_allocate(budget: f64, dues: &[f64]) -> Vec<f64> {
    let mut left = to_decimal(budget);
    let mut plan = Vec::with_capacity(dues.len());

    for due in dues {
        if left <= Decimal::ZERO {
            plan.push(0.0);
            continue;
        }
        let applied = left.min(to_decimal(*due));
        plan.push(to_f64(applied));
        left -= applied;
    }

    plan
}

// ============================================================================
// Inputs / outputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierPaymentInput {
    pub amount: f64,
    pub payment_method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    /// Unix millis; defaults to now
    pub payment_date: Option<i64>,
}

/// One settled product line
#[derive(Debug, Clone, Serialize)]
pub struct SettlementLine {
    pub product: String,
    pub applied: f64,
    pub remaining_after: f64,
}

#[derive(Debug, Serialize)]
pub struct SettlementOutcome {
    pub payment: SupplierPayment,
    pub lines: Vec<SettlementLine>,
}

// ============================================================================
// Allocator
// ============================================================================

pub struct SupplierDueAllocator {
    db: Surreal<Db>,
    suppliers: SupplierRepository,
    products: ProductRepository,
    payments: SupplierPaymentRepository,
}

impl SupplierDueAllocator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            suppliers: SupplierRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            payments: SupplierPaymentRepository::new(db.clone()),
            db,
        }
    }

    /// Record a supplier payment and settle it FIFO across the
    /// supplier's outstanding product lines
    ///
    /// Rejects before any write when the amount exceeds the supplier's
    /// total outstanding. The settlement itself runs as one transaction
    /// whose guard re-sums the outstanding, so two racing payments
    /// cannot overdraw the ledger — the loser gets a conflict.
    pub async fn settle(
        &self,
        supplier_id: &str,
        input: SupplierPaymentInput,
    ) -> AppResult<SettlementOutcome> {
        let amount = round_amount(input.amount);
        validate_positive_amount(amount, "amount")?;
        validate_required_text(&input.payment_method, "payment_method", MAX_NAME_LEN)?;
        validate_optional_text(&input.reference_number, "reference_number", MAX_REFERENCE_LEN)?;
        validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)?;

        let supplier = parse_id(supplier_id, "supplier")?;
        self.suppliers
            .find_by_id(&supplier)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier {} not found", supplier)))?;

        let outstanding = self.products.list_outstanding_by_supplier(&supplier).await?;
        let dues: Vec<f64> = outstanding.iter().map(|p| p.remaining_amount).collect();
        let total_outstanding = to_f64(sum_amounts(dues.iter()));

        if exceeds(amount, total_outstanding) {
            return Err(AppError::validation(format!(
                "Payment amount {} exceeds supplier outstanding balance {}",
                amount, total_outstanding
            )));
        }

        let plan = fifo_allocate(amount, &dues);
        let planned: Vec<(&Product, f64)> = outstanding
            .iter()
            .zip(plan.iter().copied())
            .filter(|(_, applied)| *applied > 0.0)
            .map(|(p, applied)| (p, applied))
            .collect();

        let payment_id = RecordId::from_table_key(
            "supplier_payment",
            uuid::Uuid::new_v4().simple().to_string(),
        );
        let now = shared::util::now_millis();

        // One transaction: the guard re-sums outstanding so a racing
        // settlement cannot overdraw; per-line decrements are clamped.
        let mut sql = String::from(
            r#"
            BEGIN TRANSACTION;
            LET $outstanding = math::sum((SELECT VALUE remaining_amount FROM product WHERE supplier = $supplier AND remaining_amount > 0)) OR 0;
            IF $amount > $outstanding + 0.01 { THROW "amount exceeds outstanding" };
            CREATE $payment_id CONTENT {
                supplier: $supplier,
                amount: $amount,
                payment_method: $method,
                reference_number: $reference,
                notes: $notes,
                payment_date: $date,
                created_at: $now
            };
            "#,
        );
        for index in 0..planned.len() {
            sql.push_str(&format!(
                "UPDATE $p{i} SET remaining_amount = math::fixed(math::max([remaining_amount - $a{i}, 0]), 2);\n",
                i = index
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .db
            .query(sql)
            .bind(("supplier", supplier.clone()))
            .bind(("amount", amount))
            .bind(("payment_id", payment_id.clone()))
            .bind(("method", input.payment_method.clone()))
            .bind(("reference", input.reference_number.clone()))
            .bind(("notes", input.notes.clone()))
            .bind(("date", input.payment_date.unwrap_or(now)))
            .bind(("now", now));
        for (index, (product, applied)) in planned.iter().enumerate() {
            let product_id = product
                .id
                .clone()
                .ok_or_else(|| AppError::database("Product row has no id"))?;
            query = query
                .bind((format!("p{index}"), product_id))
                .bind((format!("a{index}"), *applied));
        }

        query
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .check()
            .map_err(|e| {
                guard_conflict(
                    e,
                    "amount exceeds outstanding",
                    "Supplier balance changed concurrently, retry the payment",
                )
            })?;

        let payment = self
            .payments
            .find_by_id(&payment_id)
            .await?
            .ok_or_else(|| AppError::database("Supplier payment not found after settlement"))?;

        let mut lines = Vec::with_capacity(planned.len());
        for (product, applied) in &planned {
            let product_id = product.id.clone().expect("filtered above");
            let after = self
                .products
                .find_by_id(&product_id)
                .await?
                .map(|p| p.remaining_amount)
                .unwrap_or(0.0);
            lines.push(SettlementLine {
                product: product_id.to_string(),
                applied: *applied,
                remaining_after: after,
            });
        }

        tracing::info!(
            supplier = %supplier,
            amount = amount,
            lines = lines.len(),
            "Supplier payment settled FIFO"
        );

        Ok(SettlementOutcome { payment, lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_clears_oldest_first() {
        // 80 clears the two oldest lines entirely, newest untouched
        let plan = fifo_allocate(80.0, &[50.0, 30.0, 20.0]);
        assert_eq!(plan, vec![50.0, 30.0, 0.0]);
    }

    #[test]
    fn test_fifo_partial_second_line() {
        // 70 = 50 + 20: oldest cleared, second reduced, walk stops
        let plan = fifo_allocate(70.0, &[50.0, 30.0, 20.0]);
        assert_eq!(plan, vec![50.0, 20.0, 0.0]);
    }

    #[test]
    fn test_fifo_smaller_than_oldest_line() {
        let plan = fifo_allocate(20.0, &[50.0, 30.0]);
        assert_eq!(plan, vec![20.0, 0.0]);
    }

    #[test]
    fn test_fifo_exact_total() {
        let plan = fifo_allocate(100.0, &[50.0, 30.0, 20.0]);
        assert_eq!(plan, vec![50.0, 30.0, 20.0]);
    }

    #[test]
    fn test_fifo_never_proportional() {
        // A proportional split would put something on every line
        let plan = fifo_allocate(30.0, &[50.0, 30.0, 20.0]);
        assert_eq!(plan, vec![30.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fifo_empty_dues() {
        assert!(fifo_allocate(10.0, &[]).is_empty());
    }

    #[test]
    fn test_fifo_cent_amounts() {
        let plan = fifo_allocate(0.3, &[0.1, 0.1, 0.2]);
        assert_eq!(plan, vec![0.1, 0.1, 0.1]);
    }
}
