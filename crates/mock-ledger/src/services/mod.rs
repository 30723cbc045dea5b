//! Mock 账本服务模块
//!
//! 以内存账本实现远程账本的 REST API，并提供数据填充与故障注入的管理端点。

pub mod admin_service;
pub mod ledger_service;

#[cfg(test)]
mod ledger_service_tests;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use ecosrev_points::LedgerError;
use ecosrev_points::ledger::InMemoryLedger;
use ecosrev_points::ledger::wire::ErrorBody;
use ecosrev_shared::observability::metrics;
use tower_http::trace::TraceLayer;

use crate::store::AccountStore;

pub use admin_service::admin_routes;
pub use ledger_service::ledger_routes;

/// 账本服务状态
#[derive(Debug, Default)]
pub struct LedgerServiceState {
    pub ledger: Arc<InMemoryLedger>,
    pub accounts: AccountStore,
}

impl LedgerServiceState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 组装完整路由：`/api` 下为账本接口，另有管理、健康检查与指标端点
pub fn build_router(state: Arc<LedgerServiceState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .nest("/api", ledger_routes())
        .merge(admin_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_metrics() -> Response {
    match metrics::get_handle() {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// 接口错误，响应体沿用账本服务的 `{"errors": [{"msg": ...}]}` 格式
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                errors: vec![ecosrev_points::ledger::wire::ErrorMessage {
                    msg: message.into(),
                }],
                error: None,
            },
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Token inválido ou ausente")
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            LedgerError::Unauthorized => StatusCode::UNAUTHORIZED,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            // 客户端把 504 视为结果未知
            LedgerError::OutcomeUnknown(_) => StatusCode::GATEWAY_TIMEOUT,
            LedgerError::Transport(_) => StatusCode::BAD_GATEWAY,
            LedgerError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
