//! 积分引擎门面
//!
//! 组装账本、会话、缓存与两个服务，对 UI 暴露一组平铺的操作。

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cache::{BalanceCache, BalanceSnapshot};
use crate::error::{PointsError, Result};
use crate::ledger::LedgerService;
use crate::models::{Benefit, RedemptionSelection, ScanPayload, UserBalance};
use crate::service::{CreditReceipt, CreditService, RedemptionReceipt, RedemptionService};
use crate::session::{SessionProvider, require_credential};

/// 积分引擎
pub struct PointsEngine {
    ledger: Arc<dyn LedgerService>,
    session: Arc<dyn SessionProvider>,
    cache: Arc<BalanceCache>,
    credit: CreditService,
    redemption: RedemptionService,
}

impl PointsEngine {
    pub fn new(ledger: Arc<dyn LedgerService>, session: Arc<dyn SessionProvider>) -> Self {
        let cache = Arc::new(BalanceCache::new());
        let credit = CreditService::new(ledger.clone(), session.clone(), cache.clone());
        let redemption = RedemptionService::new(ledger.clone(), session.clone(), cache.clone());

        Self {
            ledger,
            session,
            cache,
            credit,
            redemption,
        }
    }

    /// 共享的本地缓存，页面通过 `subscribe` 观察
    pub fn cache(&self) -> Arc<BalanceCache> {
        self.cache.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// 当前用户的本地余额，未登录或尚未加载时为 None
    pub fn balance(&self) -> Option<UserBalance> {
        let credential = self.session.credential()?;
        let points = self.cache.points()?;
        Some(UserBalance::new(credential.user_id(), points))
    }

    /// 页面获得焦点时刷新余额与权益目录
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<BalanceSnapshot> {
        let credential = require_credential(self.session.as_ref())?;
        self.cache
            .refresh(self.ledger.as_ref(), &credential)
            .await
            .map_err(PointsError::refresh_failed)
    }

    pub async fn handle_scan(&self, raw: &str) -> Result<CreditReceipt> {
        self.credit.handle_scan(raw).await
    }

    pub async fn credit_from_scan(&self, payload: ScanPayload) -> Result<CreditReceipt> {
        self.credit.credit_from_scan(payload).await
    }

    /// UI 关闭扫码结果提示
    pub fn acknowledge_scan(&self) {
        self.credit.acknowledge();
    }

    pub fn scan_guard_held(&self) -> bool {
        self.credit.guard().is_held()
    }

    pub fn can_redeem(benefit: &Benefit, balance: u64) -> bool {
        RedemptionService::can_redeem(benefit, balance)
    }

    pub fn select_benefit(&self, benefit_id: &str) -> Result<RedemptionSelection> {
        self.redemption.select(benefit_id)
    }

    pub async fn redeem(&self, selection: &RedemptionSelection) -> Result<RedemptionReceipt> {
        self.redemption.redeem(selection).await
    }

    /// 登出后清空本地缓存并释放闩锁
    pub fn reset(&self) {
        self.cache.clear();
        self.credit.acknowledge();
        info!("本地积分状态已清空");
    }
}
