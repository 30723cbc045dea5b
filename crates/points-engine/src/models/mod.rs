//! 领域模型
//!
//! 包含用户余额、权益、扫码载荷、交易流水与兑换状态机定义

mod balance;
mod benefit;
mod redemption;
mod scan;
mod transaction;

pub use balance::UserBalance;
pub use benefit::Benefit;
pub use redemption::{RedemptionAttempt, RedemptionSelection, RedemptionStage};
pub use scan::ScanPayload;
pub use transaction::{TransactionKind, TransactionRecord};
