//! Sync API 模块 - 变更通知 WebSocket

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sync/ws", get(handler::ws))
}
