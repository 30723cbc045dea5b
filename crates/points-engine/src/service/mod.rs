//! 服务层
//!
//! 实现两个积分变动操作，协调账本、会话、闩锁与本地缓存。
//!
//! ## 模块结构
//!
//! - `dto`: 返回给 UI 的结果结构
//! - `credit_service`: 扫码入账
//! - `redemption_service`: 权益兑换

pub mod credit_service;
pub mod dto;
pub mod redemption_service;

pub use credit_service::CreditService;
pub use dto::*;
pub use redemption_service::RedemptionService;

use tracing::warn;

use crate::ledger::LedgerService;
use crate::models::TransactionRecord;
use crate::session::Credential;

/// 尽力写入交易流水，失败只记录日志
pub(crate) async fn append_audit(
    ledger: &dyn LedgerService,
    credential: &Credential,
    record: &TransactionRecord,
) -> bool {
    match ledger.append_transaction(credential, record).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                user_id = %record.user_id,
                kind = ?record.kind,
                source_id = %record.source_id,
                error = %e,
                "交易流水写入失败，已忽略"
            );
            false
        }
    }
}
