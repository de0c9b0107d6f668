//! Supplier API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{Product, Supplier, SupplierCreate, SupplierPayment};
use crate::db::repository::{ProductRepository, SupplierPaymentRepository, SupplierRepository};
use crate::ledger::parse_id;
use crate::ledger::supplier_due::{SettlementOutcome, SupplierDueAllocator, SupplierPaymentInput};
use crate::utils::{AppError, AppResult};
use shared::change::ChangeAction;

const RESOURCE: &str = "supplier";

/// GET /api/suppliers - 供应商列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = SupplierRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(suppliers))
}

/// POST /api/suppliers - 创建供应商
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SupplierCreate>,
) -> AppResult<Json<Supplier>> {
    crate::utils::validation::validate_required_text(
        &payload.name,
        "name",
        crate::utils::validation::MAX_NAME_LEN,
    )?;
    let supplier = SupplierRepository::new(state.db.clone())
        .create(payload)
        .await?;

    if let Some(id) = &supplier.id {
        state.broadcast_change(RESOURCE, ChangeAction::Created, &id.to_string());
    }
    Ok(Json(supplier))
}

/// GET /api/suppliers/:id - 单个供应商
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Supplier>> {
    let supplier_id = parse_id(&id, "supplier")?;
    let supplier = SupplierRepository::new(state.db.clone())
        .find_by_id(&supplier_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Supplier {} not found", id)))?;
    Ok(Json(supplier))
}

/// Product-level due view for one supplier
#[derive(Debug, Serialize)]
pub struct OutstandingResponse {
    /// Outstanding purchase lines, oldest first (the settlement order)
    pub lines: Vec<Product>,
    pub total_outstanding: f64,
}

/// GET /api/suppliers/:id/outstanding - 供应商欠款明细
pub async fn outstanding(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OutstandingResponse>> {
    let supplier_id = parse_id(&id, "supplier")?;
    let repo = ProductRepository::new(state.db.clone());

    let lines = repo.list_outstanding_by_supplier(&supplier_id).await?;
    let total_outstanding = repo.sum_outstanding_by_supplier(&supplier_id).await?;

    Ok(Json(OutstandingResponse {
        lines,
        total_outstanding,
    }))
}

/// GET /api/suppliers/:id/payments - 供应商付款记录
pub async fn list_payments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<SupplierPayment>>> {
    let supplier_id = parse_id(&id, "supplier")?;
    let payments = SupplierPaymentRepository::new(state.db.clone())
        .list_by_supplier(&supplier_id)
        .await?;
    Ok(Json(payments))
}

/// POST /api/suppliers/:id/payments - 记录供应商付款并 FIFO 结算
pub async fn settle_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SupplierPaymentInput>,
) -> AppResult<Json<SettlementOutcome>> {
    let allocator = SupplierDueAllocator::new(state.db.clone());
    let outcome = allocator.settle(&id, payload).await?;

    if let Some(payment_id) = &outcome.payment.id {
        state.broadcast_change(
            "supplier_payment",
            ChangeAction::Created,
            &payment_id.to_string(),
        );
    }
    for line in &outcome.lines {
        state.broadcast_change("product", ChangeAction::Updated, &line.product);
    }

    Ok(Json(outcome))
}
