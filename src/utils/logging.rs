/// 日志工具模块
///
/// 负责初始化 tracing（控制台 + 文件双输出）以及常用的日志格式化辅助函数
use crate::error::AppResult;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// 日志句柄
///
/// 进程内只初始化一次，退出前调用 [`LogHandle::finish`] 落盘。
pub struct LogHandle {
    path: PathBuf,
    file: File,
}

impl LogHandle {
    /// 日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入结束标记并把日志文件刷到磁盘
    pub fn finish(self) -> AppResult<()> {
        info!("日志已保存至: {}", self.path.display());
        self.file.sync_all()?;
        Ok(())
    }
}

/// 初始化日志系统
///
/// # 参数
/// - `log_dir`: 日志目录，不存在时自动创建
/// - `verbose`: 控制台是否输出 DEBUG 级别
///
/// # 返回
/// 返回日志句柄；文件中始终记录 DEBUG 及以上级别
pub fn init(log_dir: &Path, verbose: bool) -> AppResult<LogHandle> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "app_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = File::create(&path)?;
    let handle_file = file.try_clone()?;

    let console_level = if verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));

    let console_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_filter(console_filter);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LogHandle {
        path,
        file: handle_file,
    })
}

/// 打印欢迎信息
pub fn log_welcome() {
    info!("{}", "=".repeat(60));
    info!("曲阜师范大学自动评教");
    info!("当前时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
}

/// 打印分节标题
pub fn log_section(title: &str) {
    info!("\n{}", "-".repeat(60));
    info!("{}", title);
    info!("{}", "-".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `high`: 使用高分策略的数量
/// - `total`: 总数
pub fn print_final_stats(success: usize, failed: usize, high: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评教完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("高分策略: {} 门课程", high);
    info!("标准策略: {} 门课程", total.saturating_sub(high));
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
