//! 兑换选择与兑换状态机
//!
//! ```text
//! Selected → Confirmed → Debiting ─┬→ DebitFailed              (终态，可重试)
//!                                  └→ Decrementing ─┬→ Done      (终态)
//!                                                   └→ DecrementFailed (终态，按成功上报并附带警告)
//! ```

use serde::{Deserialize, Serialize};

use super::Benefit;

/// 用户选中的待兑换权益
///
/// 持有选中时刻的权益快照；未经用户确认前不会发起任何写入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionSelection {
    benefit: Benefit,
    confirmed_by_user: bool,
}

impl RedemptionSelection {
    pub fn new(benefit: Benefit) -> Self {
        Self {
            benefit,
            confirmed_by_user: false,
        }
    }

    /// 用户在确认弹窗中点击"兑换"
    pub fn confirm(mut self) -> Self {
        self.confirmed_by_user = true;
        self
    }

    pub fn benefit(&self) -> &Benefit {
        &self.benefit
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_by_user
    }
}

/// 单次兑换的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStage {
    Selected,
    Confirmed,
    /// 正在写入扣减后的余额
    Debiting,
    /// 余额写入失败，积分与库存均未变动
    DebitFailed,
    /// 余额已扣减，正在写入库存
    Decrementing,
    Done,
    /// 余额已扣减但库存写入失败
    DecrementFailed,
}

impl RedemptionStage {
    /// 是否允许从当前阶段进入 `next`
    pub fn can_transition_to(&self, next: RedemptionStage) -> bool {
        use RedemptionStage::*;
        matches!(
            (self, next),
            (Selected, Confirmed)
                | (Confirmed, Debiting)
                | (Debiting, DebitFailed)
                | (Debiting, Decrementing)
                | (Decrementing, Done)
                | (Decrementing, DecrementFailed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DebitFailed | Self::Done | Self::DecrementFailed
        )
    }

    /// 余额是否已在服务端扣减
    pub fn is_debited(&self) -> bool {
        matches!(
            self,
            Self::Decrementing | Self::Done | Self::DecrementFailed
        )
    }
}

/// 一次兑换尝试的阶段轨迹
#[derive(Debug, Clone)]
pub struct RedemptionAttempt {
    benefit_id: String,
    history: Vec<RedemptionStage>,
}

impl RedemptionAttempt {
    pub fn new(benefit_id: impl Into<String>) -> Self {
        Self {
            benefit_id: benefit_id.into(),
            history: vec![RedemptionStage::Selected],
        }
    }

    pub fn benefit_id(&self) -> &str {
        &self.benefit_id
    }

    pub fn stage(&self) -> RedemptionStage {
        self.history
            .last()
            .copied()
            .unwrap_or(RedemptionStage::Selected)
    }

    pub fn history(&self) -> &[RedemptionStage] {
        &self.history
    }

    /// 推进到下一阶段，非法迁移直接忽略并返回 false
    pub fn advance(&mut self, next: RedemptionStage) -> bool {
        if !self.stage().can_transition_to(next) {
            tracing::error!(
                benefit_id = %self.benefit_id,
                from = ?self.stage(),
                to = ?next,
                "非法的兑换状态迁移"
            );
            return false;
        }
        self.history.push(next);
        true
    }
}
