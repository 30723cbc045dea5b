//! 命令执行器

use std::sync::Arc;

use anyhow::{Context, Result};
use ecosrev_shared::config::ServerConfig;
use ecosrev_shared::observability::metrics;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::services::{LedgerServiceState, admin_service, build_router};

/// 命令执行器
pub struct CommandRunner {
    server: ServerConfig,
    service_name: String,
}

impl CommandRunner {
    pub fn new(server: ServerConfig, service_name: impl Into<String>) -> Self {
        Self {
            server,
            service_name: service_name.into(),
        }
    }

    /// 执行 serve 命令
    pub async fn run_server(
        &self,
        host: Option<String>,
        port: Option<u16>,
        populate: bool,
    ) -> Result<()> {
        let host = host.unwrap_or_else(|| self.server.host.clone());
        let port = port.unwrap_or(self.server.port);

        if let Err(e) = metrics::install_recorder(&self.service_name) {
            warn!(error = %e, "安装指标 recorder 失败，/metrics 不可用");
        }

        let state = Arc::new(LedgerServiceState::new());
        if populate {
            admin_service::apply_seed(&state, admin_service::demo_seed());
        }

        let app = build_router(state);
        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("绑定地址失败: {addr}"))?;

        info!("模拟账本服务已启动: http://{}", addr);
        info!("  /api/*        - 账本接口");
        info!("  /admin/*      - 数据填充与故障注入");
        info!("  GET /health   - 健康检查");
        info!("  GET /metrics  - Prometheus 指标");
        if populate {
            info!("  演示账号: demo@ecosrev.com / senha123（令牌 demo-token）");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器运行失败")?;

        info!("模拟账本服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "安装 CTRL+C 信号处理器失败");
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止服务...");
}
