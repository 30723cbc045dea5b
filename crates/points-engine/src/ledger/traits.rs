//! 账本服务 Trait 定义

use async_trait::async_trait;

use crate::error::LedgerResult;
use crate::models::{Benefit, TransactionRecord};
use crate::session::Credential;

/// 远程账本服务接口
///
/// 每个方法对应一次独立的远程调用，调用之间没有事务保证
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerService: Send + Sync {
    // 余额
    async fn read_balance(&self, credential: &Credential) -> LedgerResult<u64>;
    async fn write_balance(&self, credential: &Credential, points: u64) -> LedgerResult<()>;

    // 权益
    async fn read_benefit_catalog(&self, credential: &Credential) -> LedgerResult<Vec<Benefit>>;
    async fn write_benefit_quantity(
        &self,
        credential: &Credential,
        benefit_id: &str,
        quantity: u64,
    ) -> LedgerResult<()>;

    // 流水
    async fn append_transaction(
        &self,
        credential: &Credential,
        record: &TransactionRecord,
    ) -> LedgerResult<()>;
}
