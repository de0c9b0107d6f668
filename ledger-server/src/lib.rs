//! Ledger Server - 零售进销存台账服务
//!
//! # 架构概述
//!
//! 本模块是台账服务的主入口，提供以下核心功能：
//!
//! - **台账引擎** (`ledger`): 发票派生状态、支付结算、供应商 FIFO 结算、
//!   退货核销、财务汇总
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//! - **变更通知** (`core::change_feed`): 写入后推送失效事件，客户端 re-fetch
//!
//! # 模块结构
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # 配置、状态、服务器、变更通知
//! ├── api/           # HTTP 路由和处理器
//! ├── ledger/        # 台账引擎
//! ├── db/            # 数据库层 (models + repositories)
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod ledger;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{ChangeFeed, Config, Server, ServerState};
pub use ledger::{
    FinanceService, InvoiceService, PaymentAllocator, ReturnProcessor, SupplierDueAllocator,
};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置进程环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __              __
   / /   ___  ____/ /___ ____  _____
  / /   / _ \/ __  / __ `/ _ \/ ___/
 / /___/  __/ /_/ / /_/ /  __/ /
/_____/\___/\__,_/\__, /\___/_/
                 /____/
    "#
    );
}
