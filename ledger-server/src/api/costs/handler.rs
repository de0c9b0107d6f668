//! Expense Feed Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{OtherCost, SalaryPayment};
use crate::db::repository::CostRepository;
use crate::ledger::money::round_amount;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_positive_amount,
    validate_required_text,
};
use crate::utils::AppResult;
use shared::change::ChangeAction;

#[derive(Debug, Deserialize)]
pub struct CostInput {
    pub amount: f64,
    pub category: String,
    /// Unix millis; defaults to now
    pub cost_date: Option<i64>,
    pub notes: Option<String>,
}

/// POST /api/costs - 记录一笔其他成本
pub async fn create_cost(
    State(state): State<ServerState>,
    Json(payload): Json<CostInput>,
) -> AppResult<Json<OtherCost>> {
    let amount = round_amount(payload.amount);
    validate_positive_amount(amount, "amount")?;
    validate_required_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let now = shared::util::now_millis();
    let cost = CostRepository::new(state.db.clone())
        .create_cost(OtherCost {
            id: None,
            amount,
            category: payload.category,
            cost_date: payload.cost_date.unwrap_or(now),
            notes: payload.notes,
            created_at: now,
        })
        .await?;

    if let Some(id) = &cost.id {
        state.broadcast_change("other_cost", ChangeAction::Created, &id.to_string());
    }
    Ok(Json(cost))
}

/// GET /api/costs - 成本流水
pub async fn list_costs(State(state): State<ServerState>) -> AppResult<Json<Vec<OtherCost>>> {
    let costs = CostRepository::new(state.db.clone()).list_costs().await?;
    Ok(Json(costs))
}

#[derive(Debug, Deserialize)]
pub struct SalaryInput {
    pub employee_name: String,
    pub amount: f64,
    /// Unix millis; defaults to now
    pub payment_date: Option<i64>,
}

/// POST /api/salaries - 记录一笔工资发放
pub async fn create_salary(
    State(state): State<ServerState>,
    Json(payload): Json<SalaryInput>,
) -> AppResult<Json<SalaryPayment>> {
    let amount = round_amount(payload.amount);
    validate_positive_amount(amount, "amount")?;
    validate_required_text(&payload.employee_name, "employee_name", MAX_NAME_LEN)?;

    let now = shared::util::now_millis();
    let salary = CostRepository::new(state.db.clone())
        .create_salary(SalaryPayment {
            id: None,
            employee_name: payload.employee_name,
            amount,
            payment_date: payload.payment_date.unwrap_or(now),
            created_at: now,
        })
        .await?;

    if let Some(id) = &salary.id {
        state.broadcast_change("salary_payment", ChangeAction::Created, &id.to_string());
    }
    Ok(Json(salary))
}

/// GET /api/salaries - 工资流水
pub async fn list_salaries(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<SalaryPayment>>> {
    let salaries = CostRepository::new(state.db.clone()).list_salaries().await?;
    Ok(Json(salaries))
}
