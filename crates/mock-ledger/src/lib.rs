//! Mock Ledger
//!
//! 远程账本服务的内存替身，用于本地开发和 HTTP 客户端的端到端测试。
//!
//! # 主要模块
//!
//! - `services`: 账本 REST 接口与管理端点
//! - `store`: 账号与令牌存储
//! - `cli`: 命令行入口
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mock_ledger::services::{LedgerServiceState, admin_service, build_router};
//!
//! let state = Arc::new(LedgerServiceState::new());
//! admin_service::apply_seed(&state, admin_service::demo_seed());
//! let app = build_router(state);
//! ```

pub mod cli;
pub mod services;
pub mod store;
