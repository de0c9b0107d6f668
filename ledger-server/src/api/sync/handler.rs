//! Change Feed WebSocket Handler
//!
//! 把 [`ChangeFeed`](crate::core::ChangeFeed) 转发给浏览器端仪表盘。
//! 事件只含 resource/version/action/id — 客户端收到后自行 re-fetch。
//! 慢客户端 lag 丢事件时连接继续，客户端按版本号发现缺口后全量刷新。

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    /// Only forward events for this resource (table name)
    pub resource: Option<String>,
}

/// GET /api/sync/ws - 订阅变更通知
pub async fn ws(
    State(state): State<ServerState>,
    Query(query): Query<SyncQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| forward_changes(socket, state, query.resource))
}

async fn forward_changes(mut socket: WebSocket, state: ServerState, resource: Option<String>) {
    let mut rx = state.change_feed.subscribe();
    tracing::debug!(filter = ?resource, "Sync subscriber connected");

    // Pure fan-out: client messages are never read, a failed send means
    // the client went away.
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(filter) = &resource
                    && event.resource != *filter
                {
                    continue;
                }
                let Ok(text) = serde_json::to_string(&event) else {
                    continue;
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Sync subscriber lagged, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::debug!("Sync subscriber disconnected");
}
