//! Expense Feed API 模块 (其他成本 + 工资)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest(
            "/api/costs",
            Router::new().route("/", get(handler::list_costs).post(handler::create_cost)),
        )
        .nest(
            "/api/salaries",
            Router::new().route("/", get(handler::list_salaries).post(handler::create_salary)),
        )
}
