//! 远程账本访问层
//!
//! ## 设计原则
//!
//! - 账本只提供单次调用级别的原子性，没有多步事务
//! - 服务层依赖 `LedgerService` trait 而非具体实现，支持 mock 测试
//! - `HttpLedgerClient` 对接真实 HTTP 接口，`InMemoryLedger` 用于测试与本地模拟服务

mod http_client;
mod memory;
mod traits;
pub mod wire;

pub use http_client::{HttpLedgerClient, LoginOutcome};
pub use memory::{Fault, InMemoryLedger, LedgerOperation, WriteCounts};
pub use traits::*;
