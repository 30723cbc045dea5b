//! 管理端点
//!
//! 数据填充、故障注入与状态查看，仅用于测试与本地开发。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use ecosrev_points::ledger::{Fault, LedgerOperation, WriteCounts};
use ecosrev_points::{Benefit, TransactionRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, LedgerServiceState};
use crate::store::Account;

type SharedState = Arc<LedgerServiceState>;

/// 待填充的用户
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    pub user_id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nome: Option<String>,
    /// 为空表示没有积分记录
    #[serde(default)]
    pub points: Option<u64>,
    /// 预置令牌，测试中可跳过登录
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub must_reset_password: bool,
}

impl SeedUser {
    fn into_account(self) -> Account {
        Account {
            user_id: self.user_id,
            email: self.email,
            nome: self.nome,
            password: self.password,
            reset_password_token: self
                .must_reset_password
                .then(|| uuid::Uuid::new_v4().to_string()),
        }
    }
}

/// 数据填充请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedRequest {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub benefits: Vec<Benefit>,
}

/// 故障注入请求
#[derive(Debug, Clone, Deserialize)]
pub struct FaultRequest {
    pub operation: LedgerOperation,
    pub fault: Fault,
    #[serde(default = "default_fault_count")]
    pub count: usize,
}

fn default_fault_count() -> usize {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub user_id: String,
    pub email: String,
    pub points: Option<u64>,
}

/// 账本状态快照
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStateView {
    pub users: Vec<UserState>,
    pub benefits: Vec<Benefit>,
    pub transactions: Vec<TransactionRecord>,
    pub write_counts: WriteCounts,
    pub pending_faults: usize,
}

/// 创建管理路由
pub fn admin_routes() -> Router<SharedState> {
    Router::new()
        .route("/admin/seed", post(seed))
        .route("/admin/faults", post(inject_fault).delete(clear_faults))
        .route("/admin/state", get(state_view))
        .route("/admin/reset", post(reset))
}

/// 填充用户与权益（按 ID 覆盖）
pub fn apply_seed(state: &LedgerServiceState, request: SeedRequest) {
    let user_count = request.users.len();
    let benefit_count = request.benefits.len();

    for user in request.users {
        if let Some(points) = user.points {
            state.ledger.set_balance(&user.user_id, points);
        }
        if let Some(token) = &user.token {
            state.accounts.register_token(token, &user.user_id);
        }
        state.accounts.register(user.into_account());
    }
    for benefit in request.benefits {
        state.ledger.upsert_benefit(benefit);
    }

    info!(user_count, benefit_count, "模拟账本数据已填充");
}

/// 演示数据：一个 100 积分的用户和三个权益
pub fn demo_seed() -> SeedRequest {
    SeedRequest {
        users: vec![SeedUser {
            user_id: "user-demo".to_string(),
            email: "demo@ecosrev.com".to_string(),
            password: "senha123".to_string(),
            nome: Some("Demo".to_string()),
            points: Some(100),
            token: Some("demo-token".to_string()),
            must_reset_password: false,
        }],
        benefits: vec![
            Benefit::new("B1", "Cupom feira orgânica", 40, 3).with_address("Praça Central, 10"),
            Benefit::new("B2", "Sacola retornável", 15, 10),
            Benefit::new("B3", "Muda de árvore", 80, 0),
        ],
    }
}

async fn seed(
    State(state): State<SharedState>,
    Json(request): Json<SeedRequest>,
) -> Result<Json<LedgerStateView>, ApiError> {
    if request.users.iter().any(|u| u.user_id.trim().is_empty()) {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "userId obrigatório"));
    }
    apply_seed(&state, request);
    Ok(Json(snapshot(&state)))
}

async fn inject_fault(
    State(state): State<SharedState>,
    Json(request): Json<FaultRequest>,
) -> StatusCode {
    for _ in 0..request.count {
        state.ledger.fail_next(request.operation, request.fault);
    }
    info!(
        operation = ?request.operation,
        fault = ?request.fault,
        count = request.count,
        "已注入故障"
    );
    StatusCode::NO_CONTENT
}

async fn clear_faults(State(state): State<SharedState>) -> StatusCode {
    state.ledger.clear_faults();
    StatusCode::NO_CONTENT
}

async fn state_view(State(state): State<SharedState>) -> Json<LedgerStateView> {
    Json(snapshot(&state))
}

async fn reset(State(state): State<SharedState>) -> StatusCode {
    state.ledger.reset();
    state.accounts.clear();
    info!("模拟账本已清空");
    StatusCode::NO_CONTENT
}

fn snapshot(state: &LedgerServiceState) -> LedgerStateView {
    let mut users: Vec<UserState> = state
        .accounts
        .list()
        .into_iter()
        .map(|account| UserState {
            points: state.ledger.balance(&account.user_id),
            user_id: account.user_id,
            email: account.email,
        })
        .collect();
    users.sort_by(|a, b| a.user_id.cmp(&b.user_id));

    LedgerStateView {
        users,
        benefits: state.ledger.catalog(),
        transactions: state.ledger.transactions(),
        write_counts: state.ledger.write_counts(),
        pending_faults: state.ledger.pending_faults(),
    }
}
