//! Return / Refund Processing
//!
//! Recording a return is deliberately a two-step workflow. The submit
//! step only writes the return and its items; the invoice, the stock
//! and the financial aggregates are untouched. The explicit apply step
//! reconciles the return against the ledger: the refund counts as a
//! settlement credit in the invoice recompute and non-damaged items go
//! back into stock. Rejecting a pending return leaves the ledger alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Invoice, ProductReturn, ReturnItem};
use crate::db::repository::{
    InvoiceItemRepository, InvoiceRepository, PaymentRepository, ProductReturnRepository,
};
use crate::ledger::lifecycle::derive_status;
use crate::ledger::money::{to_decimal, to_f64};
use crate::ledger::{guard_conflict, parse_id, parse_optional_id};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_quantity, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::types::{InvoiceType, ItemCondition, ReturnStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnItemInput {
    /// Record id ("invoice_item:xyz") of the sold line
    pub invoice_item: String,
    pub quantity: i64,
    pub condition: ItemCondition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReturnInput {
    pub invoice: String,
    /// Defaults to the invoice's customer
    pub customer: Option<String>,
    pub items: Vec<ReturnItemInput>,
    pub return_reason: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReturnDetail {
    pub product_return: ProductReturn,
    pub items: Vec<ReturnItem>,
}

#[derive(Debug, Serialize)]
pub struct ApplyReturnOutcome {
    pub product_return: ProductReturn,
    pub invoice: Invoice,
    /// Product ids whose stock was restored
    pub restocked: Vec<String>,
}

pub struct ReturnProcessor {
    db: Surreal<Db>,
    invoices: InvoiceRepository,
    invoice_items: InvoiceItemRepository,
    payments: PaymentRepository,
    returns: ProductReturnRepository,
}

impl ReturnProcessor {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            invoices: InvoiceRepository::new(db.clone()),
            invoice_items: InvoiceItemRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            returns: ProductReturnRepository::new(db.clone()),
            db,
        }
    }

    /// Record a return request (status `pending`)
    ///
    /// `total_amount = Σ quantity × unit_price` over the selected
    /// lines; the refund defaults to the full total. There is no
    /// partial-refund or restocking-fee computation.
    pub async fn submit(&self, input: SubmitReturnInput) -> AppResult<ReturnDetail> {
        if input.items.is_empty() {
            return Err(AppError::validation("Select at least one item to return"));
        }
        validate_required_text(&input.return_reason, "return_reason", MAX_NAME_LEN)?;
        validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)?;

        let invoice_id = parse_id(&input.invoice, "invoice")?;
        let invoice = self
            .invoices
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;
        if invoice.invoice_type != InvoiceType::Sales {
            return Err(AppError::BusinessRule(
                "Returns can only be recorded against sales invoices".to_string(),
            ));
        }

        let sold = self.invoice_items.list_by_invoice(&invoice_id).await?;
        let sold_by_id: HashMap<String, _> = sold
            .iter()
            .filter_map(|item| item.id.as_ref().map(|id| (id.to_string(), item)))
            .collect();

        // Resolve and bound-check every selected line
        let mut lines = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;
        for selection in &input.items {
            validate_quantity(selection.quantity, "quantity")?;
            let item_id = parse_id(&selection.invoice_item, "invoice_item")?;
            let sold_item = sold_by_id.get(&item_id.to_string()).ok_or_else(|| {
                AppError::validation(format!(
                    "Item {} does not belong to invoice {}",
                    item_id, invoice_id
                ))
            })?;
            if selection.quantity > sold_item.quantity {
                return Err(AppError::validation(format!(
                    "Return quantity {} exceeds the sold quantity {} for {}",
                    selection.quantity, sold_item.quantity, sold_item.product_name
                )));
            }

            let line_total = to_decimal(sold_item.unit_price) * Decimal::from(selection.quantity);
            total += line_total;
            lines.push((selection, *sold_item, to_f64(line_total)));
        }

        let total_amount = to_f64(total);
        let refund_amount = total_amount; // full-refund policy

        let customer = match parse_optional_id(&input.customer, "customer")? {
            Some(id) => Some(id),
            None => invoice.customer.clone(),
        };

        let return_id =
            RecordId::from_table_key("product_return", uuid::Uuid::new_v4().simple().to_string());
        let now = shared::util::now_millis();

        // Header and items land together or not at all
        let mut sql = String::from(
            r#"
            BEGIN TRANSACTION;
            CREATE $return_id CONTENT {
                invoice: $invoice,
                customer: $customer,
                total_amount: $total_amount,
                refund_amount: $refund_amount,
                status: 'pending',
                return_reason: $reason,
                notes: $notes,
                created_at: $now,
                processed_at: NONE
            };
            "#,
        );
        for index in 0..lines.len() {
            sql.push_str(&format!(
                r#"CREATE return_item CONTENT {{
                    product_return: $return_id,
                    product: $product{i},
                    product_name: $name{i},
                    quantity: $qty{i},
                    unit_price: $price{i},
                    total_price: $line_total{i},
                    condition: $condition{i}
                }};
                "#,
                i = index
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .db
            .query(sql)
            .bind(("return_id", return_id.clone()))
            .bind(("invoice", invoice_id.clone()))
            .bind(("customer", customer))
            .bind(("total_amount", total_amount))
            .bind(("refund_amount", refund_amount))
            .bind(("reason", input.return_reason.clone()))
            .bind(("notes", input.notes.clone()))
            .bind(("now", now));
        for (index, (selection, sold_item, line_total)) in lines.iter().enumerate() {
            query = query
                .bind((format!("product{index}"), sold_item.product.clone()))
                .bind((format!("name{index}"), sold_item.product_name.clone()))
                .bind((format!("qty{index}"), selection.quantity))
                .bind((format!("price{index}"), sold_item.unit_price))
                .bind((format!("line_total{index}"), *line_total))
                .bind((format!("condition{index}"), selection.condition));
        }

        query
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .check()
            .map_err(|e| AppError::database(e.to_string()))?;

        let detail = self.detail(&return_id).await?;
        tracing::info!(
            invoice = %invoice.invoice_number,
            total = total_amount,
            items = detail.items.len(),
            "Return recorded (pending)"
        );
        Ok(detail)
    }

    /// Apply a pending return to the ledger
    ///
    /// The refund becomes a settlement credit: the invoice's
    /// remaining/status are re-derived counting it alongside payments.
    /// Non-damaged lines restore product stock.
    pub async fn apply(&self, return_id: &str) -> AppResult<ApplyReturnOutcome> {
        let return_id = parse_id(return_id, "product_return")?;
        let ret = self
            .returns
            .find_by_id(&return_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Return {} not found", return_id)))?;
        if ret.status != ReturnStatus::Pending {
            return Err(AppError::BusinessRule(format!(
                "Return {} is {}, only pending returns can be applied",
                return_id, ret.status
            )));
        }

        let invoice_id = ret.invoice.clone();
        let invoice = self
            .invoices
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice {} not found", invoice_id)))?;

        // Re-derive with the refund counted as settled
        let paid = self.payments.sum_for_invoice(&invoice_id).await?;
        let refunded = self.returns.sum_processed_refunds(&invoice_id).await?;
        let (remaining, status) = derive_status(
            invoice.total_amount,
            invoice.advance_payment,
            paid + refunded + ret.refund_amount,
        );

        let items = self.returns.list_items(&return_id).await?;
        let restock: Vec<(RecordId, i64)> = items
            .iter()
            .filter(|item| item.condition != ItemCondition::Damaged)
            .filter_map(|item| item.product.clone().map(|p| (p, item.quantity)))
            .collect();

        let now = shared::util::now_millis();
        let mut sql = String::from(
            r#"
            BEGIN TRANSACTION;
            LET $ret = (SELECT * FROM $return_id)[0];
            IF $ret IS NONE { THROW "return not found" };
            IF $ret.status != 'pending' { THROW "return is not pending" };
            UPDATE $return_id SET status = 'processed', processed_at = $now;
            UPDATE $invoice SET remaining_amount = $remaining, status = $status, updated_at = $now;
            "#,
        );
        for index in 0..restock.len() {
            sql.push_str(&format!(
                "UPDATE $restock{i} SET quantity += $restock_qty{i};\n",
                i = index
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .db
            .query(sql)
            .bind(("return_id", return_id.clone()))
            .bind(("invoice", invoice_id.clone()))
            .bind(("remaining", remaining))
            .bind(("status", status))
            .bind(("now", now));
        for (index, (product_id, quantity)) in restock.iter().enumerate() {
            query = query
                .bind((format!("restock{index}"), product_id.clone()))
                .bind((format!("restock_qty{index}"), *quantity));
        }

        query
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .check()
            .map_err(|e| {
                guard_conflict(
                    e,
                    "return is not pending",
                    "Return was processed concurrently",
                )
            })?;

        let product_return = self
            .returns
            .find_by_id(&return_id)
            .await?
            .ok_or_else(|| AppError::database("Return not found after apply"))?;
        let invoice = self
            .invoices
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| AppError::database("Invoice not found after apply"))?;

        tracing::info!(
            invoice = %invoice.invoice_number,
            refund = product_return.refund_amount,
            restocked = restock.len(),
            "Return applied to ledger"
        );

        Ok(ApplyReturnOutcome {
            product_return,
            invoice,
            restocked: restock.iter().map(|(id, _)| id.to_string()).collect(),
        })
    }

    /// Reject a pending return; the ledger stays untouched
    pub async fn reject(&self, return_id: &str) -> AppResult<ProductReturn> {
        let return_id = parse_id(return_id, "product_return")?;
        let ret = self
            .returns
            .find_by_id(&return_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Return {} not found", return_id)))?;
        if ret.status != ReturnStatus::Pending {
            return Err(AppError::BusinessRule(format!(
                "Return {} is {}, only pending returns can be rejected",
                return_id, ret.status
            )));
        }

        let now = shared::util::now_millis();
        let updated: Option<ProductReturn> = self
            .db
            .query("UPDATE $return_id SET status = 'rejected', processed_at = $now WHERE status = 'pending'")
            .bind(("return_id", return_id.clone()))
            .bind(("now", now))
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .take(0)
            .map_err(|e| AppError::database(e.to_string()))?;

        updated.ok_or_else(|| {
            AppError::Conflict("Return was processed concurrently".to_string())
        })
    }

    /// Fetch a return with its items
    pub async fn detail(&self, return_id: &RecordId) -> AppResult<ReturnDetail> {
        let product_return = self
            .returns
            .find_by_id(return_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Return {} not found", return_id)))?;
        let items = self.returns.list_items(return_id).await?;
        Ok(ReturnDetail {
            product_return,
            items,
        })
    }
}
