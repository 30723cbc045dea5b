//! 服务层返回给 UI 的数据结构

use serde::Serialize;

use crate::models::RedemptionStage;

/// 扫码入账结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReceipt {
    pub scan_hash: String,
    pub points_awarded: u64,
    pub previous_balance: u64,
    pub new_balance: u64,
    /// 流水是否写入成功；失败不影响入账结果
    pub audit_recorded: bool,
}

/// 余额已扣减但库存写入失败时附带的警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRedemption {
    pub benefit_id: String,
    pub message: String,
    /// 库存写入可能已经生效
    pub outcome_unknown: bool,
}

/// 兑换结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionReceipt {
    pub benefit_id: String,
    pub benefit_name: String,
    pub points_spent: u64,
    pub previous_balance: u64,
    pub new_balance: u64,
    pub final_stage: RedemptionStage,
    pub stages: Vec<RedemptionStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<PartialRedemption>,
    pub audit_recorded: bool,
}

impl RedemptionReceipt {
    /// 余额与库存是否都已写入
    pub fn is_complete(&self) -> bool {
        self.final_stage.is_terminal() && self.final_stage.is_debited() && self.warning.is_none()
    }
}
