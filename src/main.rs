use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use cc98_checkin::batch::LogSink;
use cc98_checkin::config::Config;
use cc98_checkin::{init_log_env, scheduler};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:145.0) Gecko/20100101 Firefox/145.0";

#[derive(Parser)]
#[command(name = "cc98-checkin", about = "CC98 每日自动签到", version)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Keep running, repeating the batch every interval (default one hour).
    #[arg(long = "loop")]
    loop_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_log_env();
    let cli = Cli::parse();

    if !cli.config.exists() {
        Config::write_sample(&cli.config)?;
        error!(
            "配置文件 {} 不存在，已创建示例配置，请填入用户名和密码后重新运行",
            cli.config.display()
        );
        std::process::exit(1);
    }
    let config = Config::load(&cli.config)?;
    info!(users = config.users.len(), gateway = ?config.gateway, "config loaded");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    scheduler::run(&client, &config, cli.loop_mode, &LogSink, shutdown).await?;
    Ok(())
}
