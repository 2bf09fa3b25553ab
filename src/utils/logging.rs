//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::orchestrator::RunResult;

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n页面重复处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加内容到日志文件
pub fn append_log(log_file_path: &str, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `source`: 源文档
/// - `directives`: 指令数量
/// - `max_concurrent`: 最大并发数（0 表示不限制）
pub fn log_startup(source: &str, directives: usize, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 页面重复处理");
    info!("📄 源文档: {}", source);
    info!("📋 指令数量: {}", directives);
    if max_concurrent > 0 {
        info!("📊 最大并发数: {}", max_concurrent);
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(result: &RunResult, log_file_path: Option<&str>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 源文档页数: {}", result.source_pages);
    info!("✅ 成功: {}/{}", result.succeeded, result.total());
    info!("❌ 失败: {}", result.failures.len());
    info!("{}", "=".repeat(60));
    if let Some(path) = log_file_path {
        info!("\n日志已保存至: {}", path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
