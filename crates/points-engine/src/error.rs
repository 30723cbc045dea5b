//! 积分引擎错误类型
//!
//! 分两层：
//! - `LedgerError`：远程账本调用失败（传输、状态码、解析）
//! - `PointsError`：暴露给 UI 层的业务错误分类，附带重试安全性判定

use serde::Serialize;
use thiserror::Error;

/// 远程账本调用错误
#[derive(Debug, Error)]
pub enum LedgerError {
    /// 请求未到达服务端（连接失败等），写入一定未生效
    #[error("账本请求发送失败: {0}")]
    Transport(String),

    /// 请求已发出但未收到确认（超时、连接中断），写入可能已经生效
    #[error("账本请求结果未知: {0}")]
    OutcomeUnknown(String),

    #[error("账本服务返回错误: status={status}, message={message}")]
    Status { status: u16, message: String },

    #[error("凭证无效或已过期")]
    Unauthorized,

    #[error("账本资源不存在: {0}")]
    NotFound(String),

    #[error("账本响应解析失败: {0}")]
    Decode(String),
}

/// 账本调用 Result 类型别名
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// 写入结果是否未知（重试可能造成重复扣减或重复入账）
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::OutcomeUnknown(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "LEDGER_UNREACHABLE",
            Self::OutcomeUnknown(_) => "LEDGER_OUTCOME_UNKNOWN",
            Self::Status { .. } => "LEDGER_STATUS_ERROR",
            Self::Unauthorized => "LEDGER_UNAUTHORIZED",
            Self::NotFound(_) => "LEDGER_NOT_FOUND",
            Self::Decode(_) => "LEDGER_DECODE_ERROR",
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        // 连接阶段的失败（包括连接超时）说明请求从未发出
        if err.is_connect() || err.is_builder() {
            Self::Transport(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::OutcomeUnknown(err.to_string())
        }
    }
}

/// 入账流程中失败的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStage {
    ReadBalance,
    WriteBalance,
}

impl std::fmt::Display for CreditStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadBalance => f.write_str("read_balance"),
            Self::WriteBalance => f.write_str("write_balance"),
        }
    }
}

/// 失败后用户重新发起操作是否安全
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetrySafety {
    /// 之前的写入确定未生效，可以直接重试
    Safe,
    /// 写入可能已生效，重试前应先刷新余额确认
    UnknownOutcome,
    /// 重试不会改变结果（需要重新登录、换一个二维码等）
    NotRetryable,
}

/// 积分引擎错误类型
#[derive(Debug, Error)]
pub enum PointsError {
    #[error("未登录或凭证已失效")]
    Unauthorized,

    #[error("二维码内容无效: {0}")]
    InvalidPayload(String),

    #[error("上一次扫码结果尚未确认，本次扫码已丢弃")]
    DuplicateScan,

    #[error("积分不足: 需要 {required}, 可用 {available}")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("兑换尚未经用户确认: benefit_id={0}")]
    NotConfirmed(String),

    #[error("权益不可兑换: benefit_id={0}")]
    BenefitUnavailable(String),

    #[error("本地余额尚未加载，请先刷新")]
    BalanceNotLoaded,

    #[error("积分入账失败（{stage}）: {source}")]
    CreditFailed {
        stage: CreditStage,
        #[source]
        source: LedgerError,
    },

    #[error("刷新余额与权益目录失败: {0}")]
    RefreshFailed(#[source] LedgerError),

    #[error("兑换扣减积分失败: benefit_id={benefit_id}, {source}")]
    RedemptionFailed {
        benefit_id: String,
        #[source]
        source: LedgerError,
    },
}

/// 积分引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, PointsError>;

impl PointsError {
    /// 入账失败；账本返回 401 时归类为需要重新登录
    pub(crate) fn credit_failed(stage: CreditStage, source: LedgerError) -> Self {
        match source {
            LedgerError::Unauthorized => Self::Unauthorized,
            source => Self::CreditFailed { stage, source },
        }
    }

    /// 扣减失败；账本返回 401 时归类为需要重新登录
    pub(crate) fn redemption_failed(benefit_id: &str, source: LedgerError) -> Self {
        match source {
            LedgerError::Unauthorized => Self::Unauthorized,
            source => Self::RedemptionFailed {
                benefit_id: benefit_id.to_string(),
                source,
            },
        }
    }

    /// 刷新失败；账本返回 401 时归类为需要重新登录
    pub(crate) fn refresh_failed(source: LedgerError) -> Self {
        match source {
            LedgerError::Unauthorized => Self::Unauthorized,
            source => Self::RefreshFailed(source),
        }
    }

    /// 重试安全性
    pub fn retry_safety(&self) -> RetrySafety {
        match self {
            // 读取阶段失败时尚未发起任何写入
            Self::CreditFailed {
                stage: CreditStage::ReadBalance,
                ..
            } => RetrySafety::Safe,
            Self::CreditFailed { source, .. } | Self::RedemptionFailed { source, .. } => {
                if source.is_outcome_unknown() {
                    RetrySafety::UnknownOutcome
                } else {
                    RetrySafety::Safe
                }
            }
            Self::BalanceNotLoaded | Self::RefreshFailed(_) => RetrySafety::Safe,
            _ => RetrySafety::NotRetryable,
        }
    }

    /// 检查是否可以安全重试
    pub fn is_retryable(&self) -> bool {
        self.retry_safety() == RetrySafety::Safe
    }

    /// 检查是否为业务错误（非账本调用失败）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::CreditFailed { .. } | Self::RedemptionFailed { .. } | Self::RefreshFailed(_)
        )
    }

    /// 获取错误码（用于 UI 层展示与日志）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::DuplicateScan => "DUPLICATE_SCAN",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::NotConfirmed(_) => "NOT_CONFIRMED",
            Self::BenefitUnavailable(_) => "BENEFIT_UNAVAILABLE",
            Self::BalanceNotLoaded => "BALANCE_NOT_LOADED",
            Self::CreditFailed { .. } => "CREDIT_FAILED",
            Self::RedemptionFailed { .. } => "REDEMPTION_FAILED",
            Self::RefreshFailed(_) => "REFRESH_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_safety() {
        let known = PointsError::CreditFailed {
            stage: CreditStage::ReadBalance,
            source: LedgerError::Transport("connection refused".to_string()),
        };
        assert_eq!(known.retry_safety(), RetrySafety::Safe);
        assert!(known.is_retryable());

        let unknown = PointsError::RedemptionFailed {
            benefit_id: "B1".to_string(),
            source: LedgerError::OutcomeUnknown("timed out".to_string()),
        };
        assert_eq!(unknown.retry_safety(), RetrySafety::UnknownOutcome);
        assert!(!unknown.is_retryable());

        let read_timeout = PointsError::CreditFailed {
            stage: CreditStage::ReadBalance,
            source: LedgerError::OutcomeUnknown("timed out".to_string()),
        };
        assert_eq!(read_timeout.retry_safety(), RetrySafety::Safe);

        let write_timeout = PointsError::CreditFailed {
            stage: CreditStage::WriteBalance,
            source: LedgerError::OutcomeUnknown("timed out".to_string()),
        };
        assert_eq!(write_timeout.retry_safety(), RetrySafety::UnknownOutcome);

        assert_eq!(
            PointsError::InsufficientPoints {
                required: 50,
                available: 5
            }
            .retry_safety(),
            RetrySafety::NotRetryable
        );
        assert!(!PointsError::Unauthorized.is_retryable());
        assert!(!PointsError::DuplicateScan.is_retryable());
    }

    #[test]
    fn test_unauthorized_ledger_error_maps_to_unauthorized() {
        let err = PointsError::credit_failed(CreditStage::WriteBalance, LedgerError::Unauthorized);
        assert!(matches!(err, PointsError::Unauthorized));

        let err = PointsError::redemption_failed("B1", LedgerError::Unauthorized);
        assert!(matches!(err, PointsError::Unauthorized));

        let err = PointsError::redemption_failed(
            "B1",
            LedgerError::Status {
                status: 500,
                message: "boom".to_string(),
            },
        );
        assert_eq!(err.error_code(), "REDEMPTION_FAILED");
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(PointsError::DuplicateScan.is_business_error());
        assert!(PointsError::InvalidPayload("x".to_string()).is_business_error());
        assert!(
            !PointsError::CreditFailed {
                stage: CreditStage::WriteBalance,
                source: LedgerError::Decode("bad".to_string()),
            }
            .is_business_error()
        );
    }

    #[test]
    fn test_error_display() {
        let err = PointsError::InsufficientPoints {
            required: 50,
            available: 5,
        };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("5"));

        let err = PointsError::CreditFailed {
            stage: CreditStage::ReadBalance,
            source: LedgerError::Transport("refused".to_string()),
        };
        assert!(err.to_string().contains("read_balance"));
        assert_eq!(
            LedgerError::OutcomeUnknown("x".to_string()).error_code(),
            "LEDGER_OUTCOME_UNKNOWN"
        );
    }
}
