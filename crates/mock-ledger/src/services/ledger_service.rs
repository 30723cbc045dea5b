//! Mock 账本接口
//!
//! 实现客户端使用的全部账本接口，令牌通过 `access-token` 请求头传递。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use ecosrev_points::ledger::LedgerService;
use ecosrev_points::ledger::wire::{
    ACCESS_TOKEN_HEADER, BalanceRow, BalanceUpdate, BenefitRow, LoginRequest, LoginResponse,
    PointsHistoryEntry, QuantityUpdate, TransactionHistoryEntry, UserProfile,
};
use ecosrev_points::{Credential, TransactionKind, TransactionRecord};
use tracing::{debug, info};

use super::{ApiError, LedgerServiceState};

type SharedState = Arc<LedgerServiceState>;

/// 创建账本接口路由（挂载在 `/api` 下）
pub fn ledger_routes() -> Router<SharedState> {
    Router::new()
        .route("/usuario/login", post(login))
        .route("/usuario/me", get(me))
        .route("/usuario/pontos", get(read_balance).put(write_balance))
        .route("/beneficio", get(read_catalog))
        .route("/beneficio/resgate", put(write_quantity))
        .route("/hist/pontos", post(append_points_history))
        .route("/hist/transacoes", post(append_transaction_history))
}

/// 从请求头解析令牌并组成凭证
fn authenticate(state: &LedgerServiceState, headers: &HeaderMap) -> Result<Credential, ApiError> {
    let token = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;
    let user_id = state
        .accounts
        .resolve(token)
        .ok_or_else(ApiError::unauthorized)?;
    Ok(Credential::new(token, user_id))
}

/// 登录
async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .accounts
        .authenticate(&req.email, &req.senha)
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Email ou senha inválidos"))?;

    let access_token = state.accounts.issue_token(&account.user_id);
    let redirect_url = account
        .reset_password_token
        .as_ref()
        .map(|_| "/reset-password".to_string());

    info!(user_id = %account.user_id, "模拟账本登录成功");

    Ok(Json(LoginResponse {
        access_token,
        redirect_url,
    }))
}

/// 当前用户资料
async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let credential = authenticate(&state, &headers)?;
    let account = state
        .accounts
        .find_by_user_id(credential.user_id())
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Usuário não encontrado"))?;

    Ok(Json(UserProfile {
        id: account.user_id,
        nome: account.nome,
        email: Some(account.email),
        reset_password_token: account.reset_password_token,
    }))
}

/// 查询余额；没有积分记录的用户返回空数组
async fn read_balance(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BalanceRow>>, ApiError> {
    let credential = authenticate(&state, &headers)?;
    let points = state.ledger.read_balance(&credential).await?;

    if state.ledger.balance(credential.user_id()).is_none() {
        return Ok(Json(Vec::new()));
    }

    Ok(Json(vec![BalanceRow {
        pontos: i64::try_from(points).unwrap_or(i64::MAX),
    }]))
}

/// 覆盖写入余额
async fn write_balance(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<BalanceUpdate>,
) -> Result<Json<BalanceUpdate>, ApiError> {
    let credential = authenticate(&state, &headers)?;
    state.ledger.write_balance(&credential, req.pontos).await?;

    debug!(user_id = %credential.user_id(), pontos = req.pontos, "余额已写入");
    Ok(Json(req))
}

/// 权益目录（包含无库存的条目，由客户端过滤）
async fn read_catalog(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BenefitRow>>, ApiError> {
    let credential = authenticate(&state, &headers)?;
    let catalog = state.ledger.read_benefit_catalog(&credential).await?;
    Ok(Json(catalog.iter().map(BenefitRow::from).collect()))
}

/// 覆盖写入权益库存
async fn write_quantity(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<QuantityUpdate>,
) -> Result<Json<QuantityUpdate>, ApiError> {
    let credential = authenticate(&state, &headers)?;
    state
        .ledger
        .write_benefit_quantity(&credential, &req.id, req.quantidade)
        .await?;

    debug!(benefit_id = %req.id, quantidade = req.quantidade, "库存已写入");
    Ok(Json(req))
}

/// 扫码入账历史
async fn append_points_history(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<PointsHistoryEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let credential = authenticate(&state, &headers)?;
    let record = TransactionRecord {
        user_id: req.id_user,
        kind: TransactionKind::ScanCredit,
        delta: i64::try_from(req.points).unwrap_or(i64::MAX),
        description: format!("扫码入账 {} 积分", req.points),
        source_id: req.id,
    };
    state.ledger.append_transaction(&credential, &record).await?;
    Ok(StatusCode::CREATED)
}

/// 兑换历史
async fn append_transaction_history(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<TransactionHistoryEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let credential = authenticate(&state, &headers)?;
    let record = TransactionRecord {
        user_id: req.id_user,
        kind: TransactionKind::Redemption,
        delta: -i64::try_from(req.points).unwrap_or(i64::MAX),
        description: req.description,
        source_id: req.id,
    };
    state.ledger.append_transaction(&credential, &record).await?;
    Ok(StatusCode::CREATED)
}
