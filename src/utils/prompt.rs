//! 终端交互输入

use crate::error::AppResult;
use std::io::{self, BufRead, Write};

/// 打印提示并读取一行输入（去掉首尾空白）
pub fn read_line(prompt: &str) -> AppResult<String> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// 在阻塞线程池中读取一行输入，避免占住异步运行时
pub async fn read_line_async(prompt: impl Into<String>) -> AppResult<String> {
    let prompt = prompt.into();
    tokio::task::spawn_blocking(move || read_line(&prompt))
        .await
        .map_err(io::Error::other)?
}

/// 询问 y/n，只有输入 `y`（不区分大小写）才算确认
pub async fn confirm(prompt: impl Into<String>) -> AppResult<bool> {
    let answer = read_line_async(prompt).await?;
    Ok(is_yes(&answer))
}

/// 等待回车
pub async fn pause(prompt: impl Into<String>) -> AppResult<()> {
    read_line_async(prompt).await.map(|_| ())
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
