//! 权益兑换服务
//!
//! 账本没有多步事务，兑换按固定顺序逐步写入：
//!
//! 1. 确认检查 -> 2. 本地余额检查 -> 3. 扣减余额 -> 4. 扣减库存
//!    -> 5. 尽力写流水 -> 6. 重新拉取权益目录
//!
//! 先扣余额再扣库存：余额写入失败时什么都没有发生，可以直接重试；
//! 库存写入失败时用户已付出积分，按成功上报并附带 `PartialRedemption` 警告，
//! 不做反向补偿。

use std::sync::Arc;

use ecosrev_shared::observability::metrics::record_redemption;
use tracing::{error, info, instrument, warn};

use super::append_audit;
use super::dto::{PartialRedemption, RedemptionReceipt};
use crate::cache::BalanceCache;
use crate::error::{PointsError, Result};
use crate::ledger::LedgerService;
use crate::models::{
    Benefit, RedemptionAttempt, RedemptionSelection, RedemptionStage, TransactionRecord,
    UserBalance,
};
use crate::session::{Credential, SessionProvider, require_credential};

/// 权益兑换服务
pub struct RedemptionService {
    ledger: Arc<dyn LedgerService>,
    session: Arc<dyn SessionProvider>,
    cache: Arc<BalanceCache>,
}

impl RedemptionService {
    pub fn new(
        ledger: Arc<dyn LedgerService>,
        session: Arc<dyn SessionProvider>,
        cache: Arc<BalanceCache>,
    ) -> Self {
        Self {
            ledger,
            session,
            cache,
        }
    }

    /// 给定余额下权益是否可兑换，用于 UI 置灰按钮
    pub fn can_redeem(benefit: &Benefit, balance: u64) -> bool {
        benefit.is_redeemable_with(balance)
    }

    /// 从本地目录中选中一个权益，得到未确认的选择
    pub fn select(&self, benefit_id: &str) -> Result<RedemptionSelection> {
        self.cache
            .find_benefit(benefit_id)
            .map(RedemptionSelection::new)
            .ok_or_else(|| PointsError::BenefitUnavailable(benefit_id.to_string()))
    }

    /// 兑换已确认的选择
    #[instrument(skip_all, fields(benefit_id = %selection.benefit().id))]
    pub async fn redeem(&self, selection: &RedemptionSelection) -> Result<RedemptionReceipt> {
        let result = self.execute(selection).await;

        match &result {
            Ok(receipt) if receipt.warning.is_some() => record_redemption("partial"),
            Ok(_) => record_redemption("success"),
            Err(e) => {
                record_redemption(e.error_code());
                warn!(
                    benefit_id = %selection.benefit().id,
                    error = %e,
                    error_code = e.error_code(),
                    retry_safety = ?e.retry_safety(),
                    "权益兑换失败"
                );
            }
        }

        result
    }

    async fn execute(&self, selection: &RedemptionSelection) -> Result<RedemptionReceipt> {
        let benefit = selection.benefit();
        let mut attempt = RedemptionAttempt::new(benefit.id.clone());

        // 1. 未经用户确认不发起任何写入
        if !selection.is_confirmed() {
            return Err(PointsError::NotConfirmed(benefit.id.clone()));
        }
        attempt.advance(RedemptionStage::Confirmed);

        let credential = require_credential(self.session.as_ref())?;

        // 2. 使用本地缓存余额检查
        let balance = self
            .cache
            .points()
            .map(|points| UserBalance::new(credential.user_id(), points))
            .ok_or(PointsError::BalanceNotLoaded)?;
        if !benefit.is_available() {
            return Err(PointsError::BenefitUnavailable(benefit.id.clone()));
        }
        if !balance.covers(benefit.point_cost) {
            return Err(PointsError::InsufficientPoints {
                required: benefit.point_cost,
                available: balance.points,
            });
        }

        let previous_balance = balance.points;
        let new_balance = previous_balance - benefit.point_cost;
        let new_quantity = benefit.available_quantity - 1;

        // 3. 扣减余额
        attempt.advance(RedemptionStage::Debiting);
        if let Err(e) = self.ledger.write_balance(&credential, new_balance).await {
            attempt.advance(RedemptionStage::DebitFailed);
            return Err(PointsError::redemption_failed(&benefit.id, e));
        }
        self.cache.apply_points(new_balance);

        // 4. 扣减库存
        attempt.advance(RedemptionStage::Decrementing);
        let warning = match self
            .ledger
            .write_benefit_quantity(&credential, &benefit.id, new_quantity)
            .await
        {
            Ok(()) => {
                attempt.advance(RedemptionStage::Done);
                None
            }
            Err(e) => {
                attempt.advance(RedemptionStage::DecrementFailed);
                error!(
                    user_id = %credential.user_id(),
                    benefit_id = %benefit.id,
                    new_quantity,
                    error = %e,
                    "积分已扣减但库存更新失败"
                );
                Some(PartialRedemption {
                    benefit_id: benefit.id.clone(),
                    message: e.to_string(),
                    outcome_unknown: e.is_outcome_unknown(),
                })
            }
        };

        // 5. 写流水
        let record = TransactionRecord::redemption(credential.user_id(), benefit);
        let audit_recorded = append_audit(self.ledger.as_ref(), &credential, &record).await;

        // 6. 刷新权益目录
        self.refresh_catalog(&credential).await;

        info!(
            user_id = %credential.user_id(),
            benefit_id = %benefit.id,
            benefit_name = %benefit.name,
            points_spent = benefit.point_cost,
            new_balance,
            stage = ?attempt.stage(),
            "权益兑换完成"
        );

        Ok(RedemptionReceipt {
            benefit_id: attempt.benefit_id().to_string(),
            benefit_name: benefit.name.clone(),
            points_spent: benefit.point_cost,
            previous_balance,
            new_balance,
            final_stage: attempt.stage(),
            stages: attempt.history().to_vec(),
            warning,
            audit_recorded,
        })
    }

    async fn refresh_catalog(&self, credential: &Credential) {
        match self.ledger.read_benefit_catalog(credential).await {
            Ok(catalog) => self.cache.apply_catalog(catalog),
            Err(e) => warn!(error = %e, "兑换后刷新权益目录失败，保留旧目录"),
        }
    }
}
