use serde::{Deserialize, Serialize};

/// 用户积分余额
///
/// 权威值由远程账本持有，本地只保存最近一次读取或写入确认的镜像
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    pub user_id: String,
    pub points: u64,
}

impl UserBalance {
    pub fn new(user_id: impl Into<String>, points: u64) -> Self {
        Self {
            user_id: user_id.into(),
            points,
        }
    }

    /// 余额是否足以支付指定积分
    pub fn covers(&self, cost: u64) -> bool {
        self.points >= cost
    }
}
