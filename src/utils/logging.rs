/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{Counters, SideStats};

/// 初始化 tracing
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={},chromiumoxide=warn", env!("CARGO_CRATE_NAME"), default_level))
    });
    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 动态批量清理");
    if config.days == 0 {
        info!("📅 不按时间过滤");
    } else {
        info!("📅 只处理 {} 天以前的条目", config.days);
    }
    match config.count {
        Some(count) => info!("🎯 目标数量: {}", count),
        None => info!("🎯 目标数量: 不限"),
    }
    if config.dry_run {
        info!("🧪 模拟模式：所有操作最终都会取消");
    }
    info!("{}", "=".repeat(60));
}

/// 记录一轮扫描开始
pub fn log_pass_start(pass: usize, found: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始第 {} 轮，找到 {} 个条目", pass, found);
    info!("{}", "=".repeat(60));
}

/// 记录一轮扫描结束
pub fn log_pass_complete(pass: usize, purged: usize, counters: &Counters) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 轮完成: 本轮处理 {} 条，累计删除 {}，隐藏 {}",
        pass,
        purged,
        counters.deleted(),
        counters.hidden()
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    counters: &Counters,
    side: &SideStats,
    elapsed: Duration,
    audit_file: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("耗时: {:.1} 秒", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("🗑️ 删除: {}", counters.deleted());
    info!("🙈 隐藏: {}", counters.hidden());
    info!("⏭️ 跳过: {}", side.skipped);
    info!("❌ 错误: {}", side.errored);
    info!("{}", "=".repeat(60));
    info!("\n审计日志已保存至: {}", audit_file);
}
