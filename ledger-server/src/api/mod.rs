//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`invoices`] - 发票创建、查询与客户支付
//! - [`suppliers`] - 供应商、欠款视图与供应商付款
//! - [`customers`] - 客户与派生余额
//! - [`products`] - 商品查询
//! - [`returns`] - 退货记录与核销
//! - [`costs`] - 成本/工资费用流水
//! - [`finance`] - 财务汇总
//! - [`sync`] - 变更通知 WebSocket

pub mod costs;
pub mod customers;
pub mod finance;
pub mod health;
pub mod invoices;
pub mod products;
pub mod returns;
pub mod suppliers;
pub mod sync;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
