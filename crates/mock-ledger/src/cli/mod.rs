//! CLI 模块
//!
//! # 使用示例
//!
//! ```bash
//! # 启动服务并填充演示数据
//! mock-ledger serve --port 8095 --populate
//!
//! # 注入一次余额写入超时
//! curl -X POST localhost:8095/admin/faults \
//!   -H 'content-type: application/json' \
//!   -d '{"operation":"write_balance","fault":"timeout"}'
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::CommandRunner;
