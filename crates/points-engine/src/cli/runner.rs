//! 命令执行器
//!
//! 把命令行参数转化为积分引擎调用，结果以 JSON 输出到 stdout，日志走 stderr。

use std::sync::Arc;

use anyhow::{Context, Result};
use ecosrev_shared::config::LedgerConfig;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::commands::Commands;
use crate::engine::PointsEngine;
use crate::error::PointsError;
use crate::ledger::HttpLedgerClient;
use crate::models::Benefit;
use crate::session::{Credential, MemorySession};

/// 命令执行器
pub struct CommandRunner {
    client: Arc<HttpLedgerClient>,
    session: Arc<MemorySession>,
    engine: PointsEngine,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenefitView {
    #[serde(flatten)]
    benefit: Benefit,
    redeemable: bool,
}

impl CommandRunner {
    pub fn new(ledger: &LedgerConfig, credential: Option<Credential>) -> Result<Self> {
        let client = Arc::new(HttpLedgerClient::new(ledger).context("创建账本客户端失败")?);
        let session = Arc::new(match credential {
            Some(credential) => MemorySession::with_credential(credential),
            None => MemorySession::new(),
        });
        let engine = PointsEngine::new(client.clone(), session.clone());

        Ok(Self {
            client,
            session,
            engine,
        })
    }

    /// 执行子命令，返回要输出的 JSON
    pub async fn run(&self, command: Commands) -> Result<serde_json::Value> {
        match command {
            Commands::Login { email, password } => self.run_login(&email, &password).await,
            Commands::Balance => self.run_balance().await,
            Commands::Benefits => self.run_benefits().await,
            Commands::Scan { payload } => self.run_scan(&payload).await,
            Commands::Redeem { benefit_id, yes } => self.run_redeem(&benefit_id, yes).await,
        }
    }

    async fn run_login(&self, email: &str, password: &str) -> Result<serde_json::Value> {
        let outcome = self.client.login(email, password).await?;
        self.session.sign_in(outcome.credential.clone());

        info!(user_id = %outcome.credential.user_id(), "已登录");

        Ok(json!({
            "token": outcome.credential.token(),
            "userId": outcome.credential.user_id(),
            "mustResetPassword": outcome.must_reset_password,
        }))
    }

    async fn run_balance(&self) -> Result<serde_json::Value> {
        self.engine.refresh().await?;
        let balance = self.engine.balance().ok_or(PointsError::BalanceNotLoaded)?;
        Ok(serde_json::to_value(balance)?)
    }

    async fn run_benefits(&self) -> Result<serde_json::Value> {
        let snapshot = self.engine.refresh().await?;
        let points = snapshot.points.unwrap_or(0);
        let views: Vec<BenefitView> = snapshot
            .benefits
            .into_iter()
            .map(|benefit| BenefitView {
                redeemable: PointsEngine::can_redeem(&benefit, points),
                benefit,
            })
            .collect();

        Ok(json!({ "points": points, "benefits": views }))
    }

    async fn run_scan(&self, payload: &str) -> Result<serde_json::Value> {
        let receipt = self.engine.handle_scan(payload).await?;
        self.engine.acknowledge_scan();
        Ok(serde_json::to_value(receipt)?)
    }

    async fn run_redeem(&self, benefit_id: &str, confirmed: bool) -> Result<serde_json::Value> {
        self.engine.refresh().await?;
        let selection = self.engine.select_benefit(benefit_id)?;

        if !confirmed {
            let points = self.engine.cache().points().unwrap_or(0);
            let benefit = selection.benefit();
            return Ok(json!({
                "preview": true,
                "benefit": benefit,
                "points": points,
                "redeemable": PointsEngine::can_redeem(benefit, points),
                "hint": "使用 --yes 确认兑换",
            }));
        }

        let receipt = self.engine.redeem(&selection.confirm()).await?;
        Ok(serde_json::to_value(receipt)?)
    }
}

/// 把错误转换为输出 JSON，积分引擎错误附带错误码与重试安全性
pub fn error_report(err: &anyhow::Error) -> serde_json::Value {
    match err.downcast_ref::<PointsError>() {
        Some(e) => json!({
            "errorCode": e.error_code(),
            "message": e.to_string(),
            "retrySafety": e.retry_safety(),
            "businessError": e.is_business_error(),
        }),
        None => json!({
            "errorCode": "INTERNAL",
            "message": format!("{err:#}"),
        }),
    }
}
