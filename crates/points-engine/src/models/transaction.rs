//! 交易流水
//!
//! 只追加的审计记录，在余额写入成功之后尽力写入，失败不回滚余额

use serde::{Deserialize, Serialize};

use super::{Benefit, ScanPayload};

/// 流水类型，决定写入账本的哪个历史接口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// 扫码入账
    ScanCredit,
    /// 权益兑换
    Redemption,
}

/// 交易流水记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub user_id: String,
    pub kind: TransactionKind,
    /// 积分变动：入账为正，兑换为负
    pub delta: i64,
    pub description: String,
    /// 来源标识：扫码 hash 或权益 ID
    pub source_id: String,
}

impl TransactionRecord {
    pub fn scan_credit(user_id: &str, payload: &ScanPayload) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: TransactionKind::ScanCredit,
            delta: i64::try_from(payload.points()).unwrap_or(i64::MAX),
            description: format!("扫码入账 {} 积分", payload.points()),
            source_id: payload.hash().to_string(),
        }
    }

    pub fn redemption(user_id: &str, benefit: &Benefit) -> Self {
        Self {
            user_id: user_id.to_string(),
            kind: TransactionKind::Redemption,
            delta: -i64::try_from(benefit.point_cost).unwrap_or(i64::MAX),
            description: benefit.name.clone(),
            source_id: benefit.id.clone(),
        }
    }

    /// 变动积分的绝对值
    pub fn magnitude(&self) -> u64 {
        self.delta.unsigned_abs()
    }
}
