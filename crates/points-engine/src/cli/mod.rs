//! CLI 模块
//!
//! # 使用示例
//!
//! ```bash
//! # 登录
//! ecosrev login -e maria@example.com -p ******
//!
//! # 查询余额与权益
//! ecosrev balance
//! ecosrev benefits
//!
//! # 扫码入账
//! ecosrev scan '{"hash":"H1","pontos":25}'
//!
//! # 兑换（先预览，再确认）
//! ecosrev redeem B1
//! ecosrev redeem B1 --yes
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, error_report};
