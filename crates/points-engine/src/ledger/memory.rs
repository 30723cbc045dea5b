//! 内存账本
//!
//! 与远程账本语义一致的进程内实现：每次调用独立生效，没有跨调用事务。
//! 支持按操作注入故障，用于集成测试和本地模拟服务。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::LedgerService;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Benefit, TransactionRecord};
use crate::session::Credential;

/// 账本操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOperation {
    ReadBalance,
    WriteBalance,
    ReadCatalog,
    WriteQuantity,
    AppendTransaction,
}

/// 注入的故障
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// 服务端拒绝请求（503），写入未生效
    Rejected,
    /// 请求超时且服务端未处理，但客户端无法区分
    Timeout,
    /// 写入已生效，响应丢失
    AckLost,
    /// 令牌失效（401）
    Unauthorized,
}

impl Fault {
    fn applies_write(&self) -> bool {
        matches!(self, Self::AckLost)
    }

    fn into_error(self, operation: LedgerOperation) -> LedgerError {
        match self {
            Self::Rejected => LedgerError::Status {
                status: 503,
                message: format!("{operation:?} rejected"),
            },
            Self::Timeout | Self::AckLost => {
                LedgerError::OutcomeUnknown(format!("{operation:?} timed out"))
            }
            Self::Unauthorized => LedgerError::Unauthorized,
        }
    }
}

/// 收到的写调用次数（包括失败的调用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteCounts {
    pub balance: usize,
    pub quantity: usize,
    pub transactions: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.balance + self.quantity + self.transactions
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<String, u64>,
    benefits: Vec<Benefit>,
    transactions: Vec<TransactionRecord>,
    faults: HashMap<LedgerOperation, VecDeque<Fault>>,
    writes: WriteCounts,
}

impl LedgerState {
    fn take_fault(&mut self, operation: LedgerOperation) -> Option<Fault> {
        self.faults.get_mut(&operation).and_then(VecDeque::pop_front)
    }
}

/// 内存账本
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一次 `operation` 调用按 `fault` 失败；多次调用按顺序排队
    pub fn fail_next(&self, operation: LedgerOperation, fault: Fault) {
        self.state
            .lock()
            .faults
            .entry(operation)
            .or_default()
            .push_back(fault);
    }

    /// 清除所有尚未触发的故障
    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    pub fn pending_faults(&self) -> usize {
        self.state.lock().faults.values().map(VecDeque::len).sum()
    }

    pub fn set_balance(&self, user_id: &str, points: u64) {
        self.state
            .lock()
            .balances
            .insert(user_id.to_string(), points);
    }

    /// 用户余额；没有积分记录时为 None
    pub fn balance(&self, user_id: &str) -> Option<u64> {
        self.state.lock().balances.get(user_id).copied()
    }

    /// 新增或替换权益（按 ID）
    pub fn upsert_benefit(&self, benefit: Benefit) {
        let mut state = self.state.lock();
        match state.benefits.iter_mut().find(|b| b.id == benefit.id) {
            Some(existing) => *existing = benefit,
            None => state.benefits.push(benefit),
        }
    }

    pub fn benefit(&self, benefit_id: &str) -> Option<Benefit> {
        self.state
            .lock()
            .benefits
            .iter()
            .find(|b| b.id == benefit_id)
            .cloned()
    }

    /// 全部权益，包括无库存的条目
    pub fn catalog(&self) -> Vec<Benefit> {
        self.state.lock().benefits.clone()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.state.lock().transactions.clone()
    }

    pub fn write_counts(&self) -> WriteCounts {
        self.state.lock().writes
    }

    /// 清空所有数据、故障与计数
    pub fn reset(&self) {
        *self.state.lock() = LedgerState::default();
    }
}

#[async_trait]
impl LedgerService for InMemoryLedger {
    async fn read_balance(&self, credential: &Credential) -> LedgerResult<u64> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(LedgerOperation::ReadBalance) {
            return Err(fault.into_error(LedgerOperation::ReadBalance));
        }
        Ok(state
            .balances
            .get(credential.user_id())
            .copied()
            .unwrap_or(0))
    }

    async fn write_balance(&self, credential: &Credential, points: u64) -> LedgerResult<()> {
        let mut state = self.state.lock();
        state.writes.balance += 1;

        let fault = state.take_fault(LedgerOperation::WriteBalance);
        if fault.is_none_or(|f| f.applies_write()) {
            state
                .balances
                .insert(credential.user_id().to_string(), points);
            debug!(user_id = %credential.user_id(), points, "内存账本余额已写入");
        }

        match fault {
            Some(fault) => Err(fault.into_error(LedgerOperation::WriteBalance)),
            None => Ok(()),
        }
    }

    async fn read_benefit_catalog(&self, _credential: &Credential) -> LedgerResult<Vec<Benefit>> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(LedgerOperation::ReadCatalog) {
            return Err(fault.into_error(LedgerOperation::ReadCatalog));
        }
        Ok(state.benefits.clone())
    }

    async fn write_benefit_quantity(
        &self,
        _credential: &Credential,
        benefit_id: &str,
        quantity: u64,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock();
        state.writes.quantity += 1;

        let fault = state.take_fault(LedgerOperation::WriteQuantity);
        if fault.is_none_or(|f| f.applies_write()) {
            let Some(benefit) = state.benefits.iter_mut().find(|b| b.id == benefit_id) else {
                return Err(LedgerError::NotFound(format!("benefit {benefit_id}")));
            };
            benefit.available_quantity = quantity;
            debug!(benefit_id, quantity, "内存账本库存已写入");
        }

        match fault {
            Some(fault) => Err(fault.into_error(LedgerOperation::WriteQuantity)),
            None => Ok(()),
        }
    }

    async fn append_transaction(
        &self,
        _credential: &Credential,
        record: &TransactionRecord,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock();
        state.writes.transactions += 1;

        let fault = state.take_fault(LedgerOperation::AppendTransaction);
        if fault.is_none_or(|f| f.applies_write()) {
            state.transactions.push(record.clone());
        }

        match fault {
            Some(fault) => Err(fault.into_error(LedgerOperation::AppendTransaction)),
            None => Ok(()),
        }
    }
}
