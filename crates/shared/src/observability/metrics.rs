//! 指标模块
//!
//! 基于 metrics facade 记录积分入账、兑换与账本请求的计数。
//! 导出端由服务自行决定：模拟账本服务安装 Prometheus recorder 并通过 `/metrics` 暴露。

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 安装 Prometheus recorder
///
/// 进程内只安装一次，再次调用返回已安装的 handle。
pub fn install_recorder(service_name: &str) -> Result<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    describe_metrics();
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);

    Ok(handle)
}

/// 获取全局 Prometheus handle
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

fn describe_metrics() {
    metrics::describe_counter!("points_credits_total", "Total number of scan credit attempts");
    metrics::describe_counter!(
        "points_redemptions_total",
        "Total number of benefit redemption attempts"
    );
    metrics::describe_counter!("ledger_requests_total", "Total number of ledger requests");
    metrics::describe_histogram!(
        "ledger_request_duration_seconds",
        "Ledger request duration in seconds"
    );
}

/// 记录一次扫码入账结果
#[inline]
pub fn record_credit(status: &str) {
    metrics::counter!("points_credits_total", "status" => status.to_string()).increment(1);
}

/// 记录一次兑换结果
#[inline]
pub fn record_redemption(status: &str) {
    metrics::counter!("points_redemptions_total", "status" => status.to_string()).increment(1);
}

/// 记录一次账本请求
#[inline]
pub fn record_ledger_request(operation: &str, status: &str, duration_secs: f64) {
    metrics::counter!(
        "ledger_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "ledger_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}
