//! Change Feed - 表变更通知
//!
//! 每次写入后发布一条 [`ChangeEvent`]，通知订阅方（仪表盘、表格视图）
//! 重新拉取数据。事件不携带行数据 — 订阅方必须自行 re-fetch。
//!
//! ```text
//! handler ──► ChangeFeed (broadcast) ──┬──► WebSocket clients (/api/sync/ws)
//!                                      └──► in-process subscribers
//! ```
//!
//! 订阅使用 best-effort 语义：慢消费者会 lag 并丢事件，丢失后客户端
//! 重新全量拉取即可，不影响写路径。

use shared::change::{ChangeAction, ChangeEvent};
use tokio::sync::broadcast;

/// Capacity of the underlying broadcast channel
const CHANNEL_CAPACITY: usize = 1024;

/// 变更事件总线
///
/// Clone 共享同一个 channel；publish 端永不阻塞。
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// 发布一条变更事件
    ///
    /// 没有订阅者时静默丢弃。
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(
            resource = %event.resource,
            action = ?event.action,
            id = %event.id,
            version = event.version,
            "Change published"
        );
        let _ = self.tx.send(event);
    }

    /// 订阅所有资源的变更
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructor for events
pub fn change_event(resource: &str, version: u64, action: ChangeAction, id: &str) -> ChangeEvent {
    ChangeEvent {
        resource: resource.to_string(),
        version,
        action,
        id: id.to_string(),
        timestamp: shared::util::now_millis(),
    }
}
