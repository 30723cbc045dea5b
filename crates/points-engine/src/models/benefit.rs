//! 权益定义

use serde::{Deserialize, Serialize};

/// 可用积分兑换的权益
///
/// `available_quantity == 0` 的权益不会出现在目录视图中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    pub id: String,
    /// 权益名称
    pub name: String,
    /// 领取地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// 兑换所需积分（正整数）
    pub point_cost: u64,
    /// 剩余可兑换数量
    pub available_quantity: u64,
}

impl Benefit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        point_cost: u64,
        available_quantity: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            point_cost,
            available_quantity,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// 检查是否有库存
    pub fn is_available(&self) -> bool {
        self.available_quantity > 0
    }

    /// 检查给定余额下是否可兑换
    pub fn is_redeemable_with(&self, balance: u64) -> bool {
        self.is_available() && balance >= self.point_cost
    }
}
