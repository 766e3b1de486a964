use anyhow::Result;
use qfnu_evaluate::utils::logging;
use qfnu_evaluate::{App, Config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    let log = logging::init(&config.log_dir, config.verbose_logging)?;

    // 初始化并运行应用
    let result = tokio::select! {
        result = run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("用户主动退出程序 (Ctrl+C)");
            log.finish()?;
            // 阻塞线程可能还在等待终端输入，直接退出
            std::process::exit(130);
        }
    };

    if let Err(e) = &result {
        error!("程序运行出现异常: {:#}", e);
    }
    log.finish()?;
    result
}

async fn run(config: Config) -> Result<()> {
    App::initialize(config).await?.run().await
}
