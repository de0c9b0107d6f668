use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::core::change_feed::{ChangeFeed, change_event};
use crate::db::DbService;
use shared::change::ChangeAction;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// 客户端可以通过版本号判断收到的变更通知新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | change_feed | ChangeFeed | 表变更通知总线 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 表变更通知总线
    pub change_feed: ChangeFeed,
    /// 资源版本管理器 (用于 broadcast_change 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>) -> Self {
        Self {
            config,
            db,
            change_feed: ChangeFeed::new(),
            resource_versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/ledger.db) + schema
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("ledger.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::new(config.clone(), db_service.db)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 广播变更通知
    ///
    /// 向所有订阅者发布资源变更事件，版本号自动递增。
    /// 事件不携带行数据，订阅方需要 re-fetch。
    ///
    /// # 参数
    /// - `resource`: 表名 ("invoice", "payment", "product", ...)
    /// - `action`: 变更类型
    /// - `id`: 记录 ID ("table:key")
    pub fn broadcast_change(&self, resource: &str, action: ChangeAction, id: &str) {
        let version = self.resource_versions.increment(resource);
        self.change_feed
            .publish(change_event(resource, version, action, id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_versions_increment_per_resource() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("invoice"), 0);
        assert_eq!(versions.increment("invoice"), 1);
        assert_eq!(versions.increment("invoice"), 2);
        assert_eq!(versions.increment("payment"), 1);
        assert_eq!(versions.get("invoice"), 2);
    }

    #[tokio::test]
    async fn test_broadcast_change_carries_monotonic_versions() {
        let feed = ChangeFeed::new();
        let versions = Arc::new(ResourceVersions::new());
        let mut rx = feed.subscribe();

        // Same publish path the handlers use, without a database
        let broadcast = |resource: &str, id: &str| {
            let version = versions.increment(resource);
            feed.publish(change_event(resource, version, ChangeAction::Updated, id));
        };

        broadcast("invoice", "invoice:a");
        broadcast("invoice", "invoice:a");
        broadcast("payment", "payment:b");

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();

        assert_eq!((first.resource.as_str(), first.version), ("invoice", 1));
        assert_eq!((second.resource.as_str(), second.version), ("invoice", 2));
        // Versions are per resource, not global
        assert_eq!((third.resource.as_str(), third.version), ("payment", 1));
    }
}
