//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Invoice, Payment};
use crate::db::repository::{InvoiceRepository, PaymentRepository, ProductReturnRepository};
use crate::ledger::lifecycle::{
    CreateInvoiceInput, CreateInvoiceOutcome, InvoiceDetail, InvoiceService, derive_status,
};
use crate::ledger::parse_id;
use crate::ledger::payments::{PaymentAllocator, PaymentOutcome, RecordPaymentInput};
use crate::utils::AppResult;
use shared::change::ChangeAction;
use shared::types::{InvoiceStatus, InvoiceType};

const RESOURCE: &str = "invoice";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub invoice_type: Option<InvoiceType>,
    pub status: Option<InvoiceStatus>,
}

/// GET /api/invoices - 发票列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let repo = InvoiceRepository::new(state.db.clone());
    let invoices = repo.list(query.invoice_type, query.status).await?;
    Ok(Json(invoices))
}

/// POST /api/invoices - 创建发票（含明细行）
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateInvoiceInput>,
) -> AppResult<Json<CreateInvoiceOutcome>> {
    let service = InvoiceService::new(state.db.clone());
    let outcome = service.create(payload).await?;

    if let Some(id) = &outcome.invoice.id {
        state.broadcast_change(RESOURCE, ChangeAction::Created, &id.to_string());
    }
    for product_id in &outcome.touched_products {
        state.broadcast_change("product", ChangeAction::Updated, product_id);
    }

    Ok(Json(outcome))
}

/// GET /api/invoices/:id - 发票详情（明细、支付、退货）
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<InvoiceDetail>> {
    let service = InvoiceService::new(state.db.clone());
    let invoice_id = parse_id(&id, "invoice")?;
    let detail = service.detail(&invoice_id).await?;
    Ok(Json(detail))
}

/// GET /api/invoices/:id/payments - 发票的支付记录
pub async fn list_payments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Payment>>> {
    let invoice_id = parse_id(&id, "invoice")?;
    let payments = PaymentRepository::new(state.db.clone())
        .list_by_invoice(&invoice_id)
        .await?;
    Ok(Json(payments))
}

/// POST /api/invoices/:id/payments - 记录客户支付
pub async fn record_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RecordPaymentInput>,
) -> AppResult<Json<PaymentOutcome>> {
    let allocator = PaymentAllocator::new(state.db.clone());
    let outcome = allocator.record_payment(&id, payload).await?;

    if let Some(payment_id) = &outcome.payment.id {
        state.broadcast_change("payment", ChangeAction::Created, &payment_id.to_string());
    }
    if let Some(invoice_id) = &outcome.invoice.id {
        state.broadcast_change(RESOURCE, ChangeAction::Updated, &invoice_id.to_string());
    }

    Ok(Json(outcome))
}

/// Stored vs derived settlement columns
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub consistent: bool,
    pub stored_remaining: f64,
    pub stored_status: InvoiceStatus,
    pub derived_remaining: f64,
    pub derived_status: InvoiceStatus,
}

/// POST /api/invoices/:id/verify - 核对派生列与结算历史
///
/// 只上报，不修正。
pub async fn verify(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<VerifyReport>> {
    let invoice_id = parse_id(&id, "invoice")?;
    let invoice = InvoiceRepository::new(state.db.clone())
        .find_by_id(&invoice_id)
        .await?
        .ok_or_else(|| crate::utils::AppError::not_found(format!("Invoice {} not found", id)))?;

    let paid = PaymentRepository::new(state.db.clone())
        .sum_for_invoice(&invoice_id)
        .await?;
    let refunded = ProductReturnRepository::new(state.db.clone())
        .sum_processed_refunds(&invoice_id)
        .await?;
    let (derived_remaining, derived_status) =
        derive_status(invoice.total_amount, invoice.advance_payment, paid + refunded);

    let consistent = crate::ledger::money::money_eq(invoice.remaining_amount, derived_remaining)
        && invoice.status == derived_status;

    if !consistent {
        tracing::warn!(
            invoice = %invoice.invoice_number,
            stored = invoice.remaining_amount,
            derived = derived_remaining,
            "Stored settlement columns diverge from history"
        );
    }

    Ok(Json(VerifyReport {
        consistent,
        stored_remaining: invoice.remaining_amount,
        stored_status: invoice.status,
        derived_remaining,
        derived_status,
    }))
}
