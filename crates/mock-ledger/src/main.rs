//! Mock Ledger CLI
//!
//! 模拟账本服务的命令行入口点。

use clap::Parser;
use ecosrev_shared::config::AppConfig;
use ecosrev_shared::observability;
use mock_ledger::cli::{Cli, CommandRunner, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("mock-ledger")?;
    if let Some(level) = &cli.log_level {
        config.observability = config.observability.with_log_level(level.clone());
    }
    observability::init(&config.observability)?;

    let runner = CommandRunner::new(config.server.clone(), config.service_name.clone());

    match cli.command {
        Commands::Serve {
            host,
            port,
            populate,
        } => {
            runner.run_server(host, port, populate).await?;
        }
    }

    Ok(())
}
