//! EcoSrev 积分命令行客户端入口

use clap::Parser;
use ecosrev_points::cli::{Cli, CommandRunner, error_report};
use ecosrev_shared::config::AppConfig;
use ecosrev_shared::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load("ecosrev")?;
    if let Some(level) = &cli.log_level {
        config.observability = config.observability.with_log_level(level.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.ledger.base_url = base_url.clone();
    }

    observability::init(&config.observability)?;

    let runner = CommandRunner::new(&config.ledger, cli.credential())?;

    match runner.run(cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&error_report(&err))?);
            std::process::exit(1);
        }
    }
}
