pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod gateway;
pub mod retry;
pub mod scheduler;
pub mod signin;

pub use error::{CheckinError, Result};

use std::fs::File;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_log_env() {
    let file = File::create("app.log").expect("Failed to create log file");
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")), // 日志级别过滤（从 RUST_LOG 环境变量读取）
        )
        .with(
            fmt::layer()
                .with_file(true) // 启用文件路径
                .with_line_number(true) // 启用行号
                .with_target(true), // 启用 target（模块路径）
        )
        .with(
            // 文件层：相同格式，但输出到文件
            fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file), // 输出到 app.log 文件
        )
        .init(); // 初始化（全局唯一）
    dotenvy::dotenv().ok(); // .ok() to ignore errors if no .env
}
