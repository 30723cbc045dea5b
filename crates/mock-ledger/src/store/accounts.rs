//! 账号与令牌存储
//!
//! 使用 DashMap 保存模拟账号和已签发的访问令牌，适用于测试和开发环境。

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// 模拟账号
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    /// 存在时表示账号使用临时密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
}

/// 账号存储
#[derive(Debug, Default)]
pub struct AccountStore {
    /// email -> 账号
    accounts: DashMap<String, Account>,
    /// 令牌 -> user_id
    tokens: DashMap<String, String>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册或覆盖账号（按 email）
    pub fn register(&self, account: Account) {
        self.accounts.insert(account.email.to_lowercase(), account);
    }

    /// 校验邮箱密码
    pub fn authenticate(&self, email: &str, password: &str) -> Option<Account> {
        self.accounts
            .get(&email.to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.clone())
    }

    /// 为用户签发新令牌
    pub fn issue_token(&self, user_id: &str) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    /// 登记固定令牌，便于测试直接使用
    pub fn register_token(&self, token: &str, user_id: &str) {
        self.tokens.insert(token.to_string(), user_id.to_string());
    }

    /// 解析令牌对应的 user_id
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.get(token).map(|user_id| user_id.clone())
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    pub fn find_by_user_id(&self, user_id: &str) -> Option<Account> {
        self.accounts
            .iter()
            .find(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn clear(&self) {
        self.accounts.clear();
        self.tokens.clear();
    }
}
