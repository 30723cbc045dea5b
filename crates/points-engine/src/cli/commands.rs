//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand};

use crate::session::Credential;

/// EcoSrev 积分命令行客户端
///
/// 登录后把输出中的令牌与用户 ID 导出为 `ECOSREV_TOKEN` / `ECOSREV_USER_ID`，
/// 后续命令即可直接使用。
#[derive(Parser, Debug)]
#[command(name = "ecosrev")]
#[command(version, about = "EcoSrev 回收积分客户端")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 账本服务 API 根地址，覆盖配置文件
    #[arg(long, env = "ECOSREV_BASE_URL")]
    pub base_url: Option<String>,

    /// 访问令牌
    #[arg(long, env = "ECOSREV_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// 当前用户 ID
    #[arg(long, env = "ECOSREV_USER_ID")]
    pub user_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 令牌与用户 ID 同时提供时组成凭证
    pub fn credential(&self) -> Option<Credential> {
        match (&self.token, &self.user_id) {
            (Some(token), Some(user_id)) => Some(Credential::new(token, user_id)),
            _ => None,
        }
    }
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 邮箱密码登录，输出令牌与用户 ID
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "ECOSREV_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// 查询当前积分余额
    Balance,

    /// 列出可兑换的权益
    Benefits,

    /// 提交一次扫码内容入账
    ///
    /// 内容为二维码中的 JSON，例如 `{"hash":"H1","pontos":25}`
    Scan {
        /// 二维码原始内容
        payload: String,
    },

    /// 兑换权益
    ///
    /// 不带 `--yes` 时只展示兑换预览，不发起任何写入
    Redeem {
        /// 权益 ID
        benefit_id: String,

        /// 确认兑换
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redeem() {
        let cli = Cli::try_parse_from([
            "ecosrev", "--token", "t", "--user-id", "u", "redeem", "B1", "--yes",
        ])
        .unwrap();

        assert_eq!(cli.credential(), Some(Credential::new("t", "u")));
        match cli.command {
            Commands::Redeem { benefit_id, yes } => {
                assert_eq!(benefit_id, "B1");
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_credential_requires_both_parts() {
        let mut cli = Cli::try_parse_from(["ecosrev", "--token", "t", "--user-id", "u", "balance"])
            .unwrap();
        assert_eq!(cli.credential().unwrap().user_id(), "u");

        cli.user_id = None;
        assert!(cli.credential().is_none());

        cli.user_id = Some("u".to_string());
        cli.token = None;
        assert!(cli.credential().is_none());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
