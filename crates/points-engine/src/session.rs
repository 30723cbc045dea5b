//! 会话提供者
//!
//! 积分引擎只消费"获取当前凭证"与"是否已登录"两个能力，
//! 令牌的持久化方式由外部实现决定。

use parking_lot::RwLock;

use crate::error::{PointsError, Result};

/// 访问凭证：账本令牌 + 当前用户 ID
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    user_id: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

// 日志中不输出令牌
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// 会话提供者接口
pub trait SessionProvider: Send + Sync {
    /// 当前凭证，未登录时为 None
    fn credential(&self) -> Option<Credential>;

    fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }
}

/// 取出有效凭证，未登录时返回 `Unauthorized`
pub fn require_credential(session: &dyn SessionProvider) -> Result<Credential> {
    if !session.is_authenticated() {
        return Err(PointsError::Unauthorized);
    }
    session.credential().ok_or(PointsError::Unauthorized)
}

/// 内存会话
///
/// 进程内保存凭证，登录时写入、登出时清除
#[derive(Debug, Default)]
pub struct MemorySession {
    credential: RwLock<Option<Credential>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }

    pub fn sign_in(&self, credential: Credential) {
        *self.credential.write() = Some(credential);
    }

    pub fn sign_out(&self) {
        *self.credential.write() = None;
    }
}

impl SessionProvider for MemorySession {
    fn credential(&self) -> Option<Credential> {
        self.credential.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_sign_in_and_out() {
        let session = MemorySession::new();
        assert!(!session.is_authenticated());
        assert!(matches!(
            require_credential(&session),
            Err(PointsError::Unauthorized)
        ));

        session.sign_in(Credential::new("token-1", "user-1"));
        assert!(session.is_authenticated());
        let credential = require_credential(&session).unwrap();
        assert_eq!(credential.user_id(), "user-1");
        assert_eq!(credential.token(), "token-1");

        session.sign_out();
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::new("secret-token", "user-1");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("user-1"));
    }
}
