//! CLI 命令定义

use clap::{Parser, Subcommand};

/// 模拟账本服务命令行工具
#[derive(Parser, Debug)]
#[command(name = "mock-ledger")]
#[command(version, about = "EcoSrev 模拟账本服务")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动模拟账本 HTTP 服务
    ///
    /// 账本接口挂载在 `/api` 下，另提供 `/admin/*`、`/health`、`/metrics`
    Serve {
        /// 监听地址，默认取配置 `server.host`
        #[arg(long)]
        host: Option<String>,

        /// 服务端口，默认取配置 `server.port`
        #[arg(short, long)]
        port: Option<u16>,

        /// 是否填充演示数据
        #[arg(long)]
        populate: bool,
    },
}
