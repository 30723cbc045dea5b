//! 扫码入账服务
//!
//! ## 入账流程
//!
//! 1. 闩锁去重 -> 2. 解析二维码 -> 3. 从账本读取最新余额
//!    -> 4. 写入新余额 -> 5. 尽力写流水 -> 6. 更新本地缓存
//!
//! 余额读取始终走账本而不是本地缓存，缓存可能已经过期。

use std::sync::Arc;

use ecosrev_shared::observability::metrics::record_credit;
use tracing::{debug, info, instrument, warn};

use super::append_audit;
use super::dto::CreditReceipt;
use crate::cache::BalanceCache;
use crate::error::{CreditStage, PointsError, Result, RetrySafety};
use crate::guard::ScanGuard;
use crate::ledger::LedgerService;
use crate::models::{ScanPayload, TransactionRecord};
use crate::session::{SessionProvider, require_credential};

/// 扫码入账服务
///
/// 一个实例对应一个扫码会话，内部持有该会话的去重闩锁
pub struct CreditService {
    ledger: Arc<dyn LedgerService>,
    session: Arc<dyn SessionProvider>,
    cache: Arc<BalanceCache>,
    guard: ScanGuard,
}

impl CreditService {
    pub fn new(
        ledger: Arc<dyn LedgerService>,
        session: Arc<dyn SessionProvider>,
        cache: Arc<BalanceCache>,
    ) -> Self {
        Self {
            ledger,
            session,
            cache,
            guard: ScanGuard::new(),
        }
    }

    pub fn guard(&self) -> &ScanGuard {
        &self.guard
    }

    /// 处理摄像头上报的一帧原始二维码内容
    ///
    /// 闩锁占用期间到达的帧直接丢弃；二维码无效时闩锁保持占用，
    /// 直到 UI 调用 `acknowledge`，避免同一张无效二维码反复报错。
    #[instrument(skip_all)]
    pub async fn handle_scan(&self, raw: &str) -> Result<CreditReceipt> {
        if !self.guard.try_acquire() {
            debug!("闩锁占用中，丢弃扫码帧");
            record_credit(PointsError::DuplicateScan.error_code());
            return Err(PointsError::DuplicateScan);
        }

        let payload = match ScanPayload::decode(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "二维码内容无效");
                record_credit(e.error_code());
                return Err(e);
            }
        };

        self.credit(payload).await
    }

    /// 对已解析的二维码入账，同样受闩锁约束
    #[instrument(skip_all, fields(hash = %payload.hash(), points = payload.points()))]
    pub async fn credit_from_scan(&self, payload: ScanPayload) -> Result<CreditReceipt> {
        if !self.guard.try_acquire() {
            debug!("闩锁占用中，丢弃扫码结果");
            record_credit(PointsError::DuplicateScan.error_code());
            return Err(PointsError::DuplicateScan);
        }

        self.credit(payload).await
    }

    /// UI 关闭结果提示后释放闩锁
    pub fn acknowledge(&self) {
        self.guard.release();
        debug!("扫码结果已确认，闩锁释放");
    }

    async fn credit(&self, payload: ScanPayload) -> Result<CreditReceipt> {
        let result = self.execute(&payload).await;

        match &result {
            Ok(_) => record_credit("success"),
            Err(e) => {
                record_credit(e.error_code());
                // 写入结果未知时保持占用，重试前需要用户先确认并刷新余额
                let release = matches!(e, PointsError::Unauthorized)
                    || e.retry_safety() == RetrySafety::Safe;
                if release {
                    self.guard.release();
                }
                warn!(
                    hash = %payload.hash(),
                    error = %e,
                    error_code = e.error_code(),
                    released = release,
                    "扫码入账失败"
                );
            }
        }

        result
    }

    async fn execute(&self, payload: &ScanPayload) -> Result<CreditReceipt> {
        let credential = require_credential(self.session.as_ref())?;

        // 1. 读取账本最新余额
        let previous_balance = self
            .ledger
            .read_balance(&credential)
            .await
            .map_err(|e| PointsError::credit_failed(CreditStage::ReadBalance, e))?;

        // 2. 计算新余额
        let new_balance = previous_balance
            .checked_add(payload.points())
            .ok_or_else(|| PointsError::InvalidPayload("积分超出可表示范围".to_string()))?;

        // 3. 写入新余额
        self.ledger
            .write_balance(&credential, new_balance)
            .await
            .map_err(|e| PointsError::credit_failed(CreditStage::WriteBalance, e))?;

        // 4. 写流水，失败不回滚余额
        let record = TransactionRecord::scan_credit(credential.user_id(), payload);
        let audit_recorded = append_audit(self.ledger.as_ref(), &credential, &record).await;

        // 5. 更新本地缓存
        self.cache.apply_points(new_balance);

        info!(
            user_id = %credential.user_id(),
            hash = %payload.hash(),
            points = payload.points(),
            previous_balance,
            new_balance,
            "扫码入账成功"
        );

        Ok(CreditReceipt {
            scan_hash: payload.hash().to_string(),
            points_awarded: payload.points(),
            previous_balance,
            new_balance,
            audit_recorded,
        })
    }
}
