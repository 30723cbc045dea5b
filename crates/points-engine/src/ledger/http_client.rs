//! 账本 HTTP 客户端
//!
//! 封装对远程账本服务 REST 接口的调用，统一错误转换、日志与指标。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ecosrev_shared::config::LedgerConfig;
use ecosrev_shared::observability::metrics::record_ledger_request;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::traits::LedgerService;
use super::wire::{
    ACCESS_TOKEN_HEADER, BalanceRow, BalanceUpdate, BenefitRow, ErrorBody, LoginRequest,
    LoginResponse, PointsHistoryEntry, QuantityUpdate, TransactionHistoryEntry, UserProfile,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Benefit, TransactionKind, TransactionRecord};
use crate::session::Credential;

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub credential: Credential,
    pub profile: UserProfile,
    /// 使用临时密码登录，需要引导用户重设密码
    pub must_reset_password: bool,
}

/// 账本 HTTP 客户端
///
/// reqwest::Client 内部带连接池，clone 是廉价操作
#[derive(Clone)]
pub struct HttpLedgerClient {
    client: Client,
    base_url: String,
}

impl HttpLedgerClient {
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    /// 使用指定根地址与请求超时创建客户端
    pub fn with_timeout(base_url: &str, timeout: Duration) -> LedgerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("创建 HTTP 客户端失败: {e}")))?;

        info!(
            base_url,
            timeout_secs = timeout.as_secs(),
            "账本 HTTP 客户端已初始化"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 邮箱密码登录，并通过 `/usuario/me` 解析当前用户 ID
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> LedgerResult<LoginOutcome> {
        let request = self
            .client
            .post(self.url("/usuario/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                senha: password.to_string(),
            });
        let login: LoginResponse = decode(self.send("login", request).await?).await?;

        let profile = self.fetch_profile(&login.access_token).await?;
        let must_reset_password = profile.reset_password_token.is_some();

        info!(user_id = %profile.id, must_reset_password, "登录成功");

        Ok(LoginOutcome {
            credential: Credential::new(login.access_token, profile.id.clone()),
            profile,
            must_reset_password,
        })
    }

    /// 查询令牌对应的用户资料
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self, token: &str) -> LedgerResult<UserProfile> {
        let request = self
            .client
            .get(self.url("/usuario/me"))
            .header(ACCESS_TOKEN_HEADER, token);
        decode(self.send("fetch_profile", request).await?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header(ACCESS_TOKEN_HEADER, credential.token())
    }

    /// 发送请求并把非 2xx 响应转换为 `LedgerError`
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> LedgerResult<Response> {
        let started = Instant::now();
        let result = request.send().await;
        let elapsed = started.elapsed().as_secs_f64();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let err = LedgerError::from(e);
                record_ledger_request(operation, err.error_code(), elapsed);
                warn!(operation, error = %err, "账本请求失败");
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            record_ledger_request(operation, "ok", elapsed);
            debug!(operation, status = status.as_u16(), elapsed, "账本请求完成");
            return Ok(response);
        }

        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LedgerError::Unauthorized,
            StatusCode::NOT_FOUND => LedgerError::NotFound(operation.to_string()),
            // 网关超时说明上游可能已经处理了请求
            StatusCode::GATEWAY_TIMEOUT => {
                LedgerError::OutcomeUnknown(format!("{operation}: gateway timeout"))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.summary())
                    .unwrap_or(body);
                LedgerError::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        };

        record_ledger_request(operation, err.error_code(), elapsed);
        warn!(operation, status = status.as_u16(), error = %err, "账本返回错误");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> LedgerResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))
}

#[async_trait]
impl LedgerService for HttpLedgerClient {
    #[instrument(skip_all, fields(user_id = %credential.user_id()))]
    async fn read_balance(&self, credential: &Credential) -> LedgerResult<u64> {
        let request = self.authorized(self.client.get(self.url("/usuario/pontos")), credential);
        let rows: Vec<BalanceRow> = decode(self.send("read_balance", request).await?).await?;

        // 尚未产生积分记录的用户返回空数组
        let Some(row) = rows.first() else {
            debug!("账本中没有积分记录，按 0 处理");
            return Ok(0);
        };

        u64::try_from(row.pontos)
            .map_err(|_| LedgerError::Decode(format!("账本返回负余额: {}", row.pontos)))
    }

    #[instrument(skip_all, fields(user_id = %credential.user_id(), points))]
    async fn write_balance(&self, credential: &Credential, points: u64) -> LedgerResult<()> {
        let request = self
            .authorized(self.client.put(self.url("/usuario/pontos")), credential)
            .json(&BalanceUpdate { pontos: points });
        self.send("write_balance", request).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = %credential.user_id()))]
    async fn read_benefit_catalog(&self, credential: &Credential) -> LedgerResult<Vec<Benefit>> {
        let request = self.authorized(self.client.get(self.url("/beneficio")), credential);
        let rows: Vec<BenefitRow> = decode(self.send("read_benefit_catalog", request).await?).await?;

        let mut benefits = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_benefit() {
                Ok(benefit) => benefits.push(benefit),
                Err(reason) => warn!(reason = %reason, "跳过无效的权益条目"),
            }
        }

        Ok(benefits)
    }

    #[instrument(skip_all, fields(user_id = %credential.user_id(), benefit_id, quantity))]
    async fn write_benefit_quantity(
        &self,
        credential: &Credential,
        benefit_id: &str,
        quantity: u64,
    ) -> LedgerResult<()> {
        let request = self
            .authorized(self.client.put(self.url("/beneficio/resgate")), credential)
            .json(&QuantityUpdate {
                id: benefit_id.to_string(),
                quantidade: quantity,
            });
        self.send("write_benefit_quantity", request).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = %credential.user_id(), kind = ?record.kind))]
    async fn append_transaction(
        &self,
        credential: &Credential,
        record: &TransactionRecord,
    ) -> LedgerResult<()> {
        let request = match record.kind {
            TransactionKind::ScanCredit => self
                .client
                .post(self.url("/hist/pontos"))
                .json(&PointsHistoryEntry::from(record)),
            TransactionKind::Redemption => self
                .client
                .post(self.url("/hist/transacoes"))
                .json(&TransactionHistoryEntry::from(record)),
        };
        self.send("append_transaction", self.authorized(request, credential))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            HttpLedgerClient::with_timeout("http://localhost:8095/api/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8095/api");
        assert_eq!(
            client.url("/usuario/pontos"),
            "http://localhost:8095/api/usuario/pontos"
        );
    }

    #[test]
    fn test_new_from_config() {
        let config = LedgerConfig {
            base_url: "http://ledger.local/api".to_string(),
            timeout_seconds: 3,
        };
        let client = HttpLedgerClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://ledger.local/api");
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_a_known_failure() {
        // 端口 9 (discard) 在测试环境中通常没有监听
        let client =
            HttpLedgerClient::with_timeout("http://127.0.0.1:9/api", Duration::from_secs(2))
                .unwrap();
        let credential = Credential::new("token", "user-1");

        let err = client.write_balance(&credential, 10).await.unwrap_err();
        assert!(matches!(err, LedgerError::Transport(_)), "got {err:?}");
        assert!(!err.is_outcome_unknown());
    }
}
