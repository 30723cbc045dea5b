//! 本地余额缓存
//!
//! 保存最近一次已确认的积分余额与可兑换权益目录，供界面渲染。
//! 只有入账、兑换两个操作以及页面获得焦点时的刷新可以写入；
//! 界面通过 `subscribe` 观察变化，不能直接修改。

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::LedgerResult;
use crate::ledger::LedgerService;
use crate::models::Benefit;
use crate::session::Credential;

/// 缓存快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// 尚未读取过余额时为 None
    pub points: Option<u64>,
    /// 仅包含有库存的权益
    pub benefits: Vec<Benefit>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BalanceSnapshot {
    pub fn find_benefit(&self, benefit_id: &str) -> Option<&Benefit> {
        self.benefits.iter().find(|b| b.id == benefit_id)
    }
}

/// 本地余额缓存
///
/// 内部使用 watch 通道，多个页面可共享同一个 `Arc<BalanceCache>` 并订阅更新
#[derive(Debug)]
pub struct BalanceCache {
    state: watch::Sender<BalanceSnapshot>,
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceCache {
    pub fn new() -> Self {
        let (state, _) = watch::channel(BalanceSnapshot::default());
        Self { state }
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        self.state.borrow().clone()
    }

    pub fn points(&self) -> Option<u64> {
        self.state.borrow().points
    }

    pub fn benefits(&self) -> Vec<Benefit> {
        self.state.borrow().benefits.clone()
    }

    pub fn find_benefit(&self, benefit_id: &str) -> Option<Benefit> {
        self.state.borrow().find_benefit(benefit_id).cloned()
    }

    /// 订阅缓存变化
    pub fn subscribe(&self) -> watch::Receiver<BalanceSnapshot> {
        self.state.subscribe()
    }

    /// 写入服务端已确认的余额
    pub(crate) fn apply_points(&self, points: u64) {
        self.state.send_modify(|snapshot| {
            snapshot.points = Some(points);
            snapshot.updated_at = Some(Utc::now());
        });
    }

    /// 写入服务端返回的权益目录，过滤掉无库存的条目
    pub(crate) fn apply_catalog(&self, catalog: Vec<Benefit>) {
        let available: Vec<Benefit> = catalog.into_iter().filter(Benefit::is_available).collect();
        self.state.send_modify(|snapshot| {
            snapshot.benefits = available;
            snapshot.updated_at = Some(Utc::now());
        });
    }

    /// 登出时清空
    pub(crate) fn clear(&self) {
        self.state.send_replace(BalanceSnapshot::default());
    }

    /// 页面获得焦点时刷新：先读余额，再读权益目录
    ///
    /// 两次读取互不影响，成功的一半会写入缓存；任一失败时返回该错误，
    /// 失败的部分保留旧值。
    #[instrument(skip_all, fields(user_id = %credential.user_id()))]
    pub async fn refresh(
        &self,
        ledger: &dyn LedgerService,
        credential: &Credential,
    ) -> LedgerResult<BalanceSnapshot> {
        let balance = ledger.read_balance(credential).await;
        let catalog = ledger.read_benefit_catalog(credential).await;

        if let Ok(points) = &balance {
            self.apply_points(*points);
        }
        if let Ok(benefits) = catalog.as_ref() {
            self.apply_catalog(benefits.clone());
        }

        match (balance, catalog) {
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "刷新本地余额缓存失败，保留旧值");
                Err(e)
            }
            (Ok(points), Ok(benefits)) => {
                debug!(points, benefit_count = benefits.len(), "本地余额缓存已刷新");
                Ok(self.snapshot())
            }
        }
    }
}
