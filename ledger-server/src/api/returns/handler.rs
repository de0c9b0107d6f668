//! Return API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::ProductReturn;
use crate::db::repository::ProductReturnRepository;
use crate::ledger::parse_id;
use crate::ledger::returns::{
    ApplyReturnOutcome, ReturnDetail, ReturnProcessor, SubmitReturnInput,
};
use crate::utils::AppResult;
use shared::change::ChangeAction;
use shared::types::ReturnStatus;

const RESOURCE: &str = "product_return";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<ReturnStatus>,
}

/// GET /api/returns - 退货列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ProductReturn>>> {
    let returns = ProductReturnRepository::new(state.db.clone())
        .list(query.status)
        .await?;
    Ok(Json(returns))
}

/// POST /api/returns - 记录退货请求（pending）
pub async fn submit(
    State(state): State<ServerState>,
    Json(payload): Json<SubmitReturnInput>,
) -> AppResult<Json<ReturnDetail>> {
    let processor = ReturnProcessor::new(state.db.clone());
    let detail = processor.submit(payload).await?;

    if let Some(id) = &detail.product_return.id {
        state.broadcast_change(RESOURCE, ChangeAction::Created, &id.to_string());
    }
    Ok(Json(detail))
}

/// GET /api/returns/:id - 退货详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReturnDetail>> {
    let processor = ReturnProcessor::new(state.db.clone());
    let return_id = parse_id(&id, "product_return")?;
    let detail = processor.detail(&return_id).await?;
    Ok(Json(detail))
}

/// POST /api/returns/:id/apply - 将退货核销到台账
pub async fn apply(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApplyReturnOutcome>> {
    let processor = ReturnProcessor::new(state.db.clone());
    let outcome = processor.apply(&id).await?;

    if let Some(return_id) = &outcome.product_return.id {
        state.broadcast_change(RESOURCE, ChangeAction::Updated, &return_id.to_string());
    }
    if let Some(invoice_id) = &outcome.invoice.id {
        state.broadcast_change("invoice", ChangeAction::Updated, &invoice_id.to_string());
    }
    for product_id in &outcome.restocked {
        state.broadcast_change("product", ChangeAction::Updated, product_id);
    }

    Ok(Json(outcome))
}

/// POST /api/returns/:id/reject - 驳回退货，台账不动
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductReturn>> {
    let processor = ReturnProcessor::new(state.db.clone());
    let rejected = processor.reject(&id).await?;

    if let Some(return_id) = &rejected.id {
        state.broadcast_change(RESOURCE, ChangeAction::Updated, &return_id.to_string());
    }
    Ok(Json(rejected))
}
