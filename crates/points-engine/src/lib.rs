//! EcoSrev 积分引擎
//!
//! 回收奖励客户端的积分变动核心：扫码入账与权益兑换。
//!
//! ## 核心功能
//!
//! - **扫码入账**：解析二维码，读取账本最新余额后写入新余额
//! - **扫码去重**：单槽闩锁丢弃同一次扫码的重复帧
//! - **权益兑换**：先扣积分、再扣库存的有序写入，库存失败时附带警告
//! - **本地缓存**：可订阅的余额与权益目录快照
//! - **账本访问**：HTTP 客户端与内存实现共用 `LedgerService` trait
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `ledger`: 远程账本访问层
//! - `session`: 会话提供者
//! - `guard`: 扫码去重闩锁
//! - `cache`: 本地余额缓存
//! - `service`: 入账与兑换服务
//! - `engine`: 组装以上组件的门面
//! - `cli`: 命令行客户端

pub mod cache;
pub mod cli;
pub mod engine;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod models;
pub mod service;
pub mod session;

pub use cache::{BalanceCache, BalanceSnapshot};
pub use engine::PointsEngine;
pub use error::{CreditStage, LedgerError, LedgerResult, PointsError, Result, RetrySafety};
pub use guard::{LatchState, ScanGuard};
pub use ledger::{HttpLedgerClient, InMemoryLedger, LedgerService, LoginOutcome};
pub use models::*;
pub use service::{
    CreditReceipt, CreditService, PartialRedemption, RedemptionReceipt, RedemptionService,
};
pub use session::{Credential, MemorySession, SessionProvider, require_credential};
