//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use surrealdb::RecordId;

use crate::core::ServerState;
use crate::db::models::{Customer, CustomerCreate};
use crate::db::repository::{
    CustomerRepository, InvoiceRepository, PaymentRepository, ProductReturnRepository,
};
use crate::ledger::finance::{CustomerBalance, customer_balance};
use crate::ledger::parse_id;
use crate::utils::{AppError, AppResult};
use shared::change::ChangeAction;

const RESOURCE: &str = "customer";

/// GET /api/customers - 客户列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(customers))
}

/// POST /api/customers - 创建客户
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    crate::utils::validation::validate_required_text(
        &payload.name,
        "name",
        crate::utils::validation::MAX_NAME_LEN,
    )?;
    let customer = CustomerRepository::new(state.db.clone())
        .create(payload)
        .await?;

    if let Some(id) = &customer.id {
        state.broadcast_change(RESOURCE, ChangeAction::Created, &id.to_string());
    }
    Ok(Json(customer))
}

/// GET /api/customers/:id - 单个客户
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let customer_id = parse_id(&id, "customer")?;
    let customer = CustomerRepository::new(state.db.clone())
        .find_by_id(&customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))?;
    Ok(Json(customer))
}

/// GET /api/customers/:id/balance - 客户派生余额
///
/// balance = total_due − total_paid；负数表示商店信用（多付）。
/// 每次都从发票/支付/退款行重新计算，不落库。
pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CustomerBalance>> {
    let customer_id = parse_id(&id, "customer")?;
    CustomerRepository::new(state.db.clone())
        .find_by_id(&customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {} not found", id)))?;

    let invoices = InvoiceRepository::new(state.db.clone())
        .list_by_customer(&customer_id)
        .await?;
    let invoice_ids: Vec<RecordId> = invoices.iter().filter_map(|i| i.id.clone()).collect();

    let payments_sum = PaymentRepository::new(state.db.clone())
        .sum_for_invoices(invoice_ids.clone())
        .await?;
    let refunds_sum = ProductReturnRepository::new(state.db.clone())
        .sum_processed_refunds_for_invoices(invoice_ids)
        .await?;

    Ok(Json(customer_balance(&invoices, payments_sum, refunds_sum)))
}
