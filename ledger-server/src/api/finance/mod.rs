//! Finance API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/finance",
        Router::new().route("/summary", get(handler::summary)),
    )
}
