//! Customer Payment Allocation
//!
//! One call records exactly one payment against exactly one invoice;
//! there is no splitting. The commit path is a single transaction that
//! recomputes the remaining balance from the authoritative payment and
//! refund sums *inside* the transaction, so two racing payments against
//! the same invoice cannot both pass the balance check: the second one
//! hits the guard and surfaces as a conflict.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Invoice, Payment};
use crate::db::repository::{
    InvoiceRepository, PaymentRepository, ProductReturnRepository,
};
use crate::ledger::lifecycle::derive_status;
use crate::ledger::money::{exceeds, money_eq, round_amount};
use crate::ledger::{guard_conflict, parse_id};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_positive_amount,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentInput {
    pub amount: f64,
    pub payment_method: String,
    /// Unix millis; defaults to now
    pub payment_date: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub invoice: Invoice,
}

pub struct PaymentAllocator {
    db: Surreal<Db>,
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    returns: ProductReturnRepository,
}

impl PaymentAllocator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            invoices: InvoiceRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            returns: ProductReturnRepository::new(db.clone()),
            db,
        }
    }

    /// Record a payment and re-derive the invoice's remaining/status
    pub async fn record_payment(
        &self,
        invoice_id: &str,
        input: RecordPaymentInput,
    ) -> AppResult<PaymentOutcome> {
        let amount = round_amount(input.amount);
        validate_positive_amount(amount, "amount")?;
        validate_required_text(&input.payment_method, "payment_method", MAX_NAME_LEN)?;
        validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)?;

        let invoice_id = parse_id(invoice_id, "invoice")?;
        let invoice = self
            .invoices
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        // Authoritative remaining from the settlement history, not the
        // stored column
        let paid = self.payments.sum_for_invoice(&invoice_id).await?;
        let refunded = self.returns.sum_processed_refunds(&invoice_id).await?;
        let (remaining, status) =
            derive_status(invoice.total_amount, invoice.advance_payment, paid + refunded);

        // Drift between stored and derived columns is surfaced, never
        // silently corrected
        if !money_eq(invoice.remaining_amount, remaining) || invoice.status != status {
            return Err(AppError::InconsistentState(format!(
                "Invoice {} stores remaining {} ({}) but the settlement history derives {} ({})",
                invoice_id, invoice.remaining_amount, invoice.status, remaining, status
            )));
        }

        if exceeds(amount, remaining) {
            return Err(AppError::validation(format!(
                "Payment amount {} exceeds the invoice remaining balance {}",
                amount, remaining
            )));
        }

        let payment_id =
            RecordId::from_table_key("payment", uuid::Uuid::new_v4().simple().to_string());
        let now = shared::util::now_millis();

        // Single transaction: recompute inside, guard, insert, update.
        // After a positive payment the invoice can only be partially
        // paid or paid, so the status branch stays flat.
        let result = self
            .db
            .query(
                r#"
                BEGIN TRANSACTION;
                LET $inv = (SELECT * FROM $invoice)[0];
                IF $inv IS NONE { THROW "invoice not found" };
                LET $paid = math::sum((SELECT VALUE amount FROM payment WHERE invoice = $invoice)) OR 0;
                LET $refunded = math::sum((SELECT VALUE refund_amount FROM product_return WHERE invoice = $invoice AND status = 'processed')) OR 0;
                LET $remaining = math::max([$inv.total_amount - $inv.advance_payment - $paid - $refunded, 0]);
                IF $amount > $remaining + 0.01 { THROW "amount exceeds balance" };
                CREATE $payment_id CONTENT {
                    invoice: $invoice,
                    amount: $amount,
                    payment_method: $method,
                    payment_date: $date,
                    notes: $notes,
                    created_at: $now
                };
                LET $raw = math::max([$remaining - $amount, 0]);
                LET $new_remaining = IF $raw < 0.01 THEN 0 ELSE math::fixed($raw, 2) END;
                LET $new_status = IF $new_remaining <= 0 THEN 'paid' ELSE 'partially_paid' END;
                UPDATE $invoice SET remaining_amount = $new_remaining, status = $new_status, updated_at = $now;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("invoice", invoice_id.clone()))
            .bind(("payment_id", payment_id.clone()))
            .bind(("amount", amount))
            .bind(("method", input.payment_method.clone()))
            .bind(("date", input.payment_date.unwrap_or(now)))
            .bind(("notes", input.notes.clone()))
            .bind(("now", now))
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        result.check().map_err(|e| {
            guard_conflict(
                e,
                "amount exceeds balance",
                "Invoice balance changed concurrently, retry the payment",
            )
        })?;

        let payment = self
            .payments
            .find_by_id(&payment_id)
            .await?
            .ok_or_else(|| AppError::database("Payment not found after commit"))?;
        let invoice = self
            .invoices
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| AppError::database("Invoice not found after commit"))?;

        tracing::info!(
            invoice = %invoice.invoice_number,
            amount = amount,
            remaining = invoice.remaining_amount,
            status = %invoice.status,
            "Payment recorded"
        );

        Ok(PaymentOutcome { payment, invoice })
    }
}
