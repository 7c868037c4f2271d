// 盯盘服务主程序 - 加载配置、装配引擎、跑到中断为止
use tick_server::twcommon::{logging_setup, Result, WatchConfig};
use tick_server::twwatch::WatchEngine;

use tracing::info;

/// 默认配置文件路径
const DEFAULT_CONFIG_PATH: &str = "config/TickWatchConfig.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 配置路径允许用环境变量覆盖
    let config_path =
        std::env::var("TICK_WATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    // 启动期校验失败直接以非零码退出
    let config = WatchConfig::from_file(&config_path)?;

    logging_setup::init_logging(&config.logging.log_level);
    info!("配置加载完成: {}", config_path);

    let engine = WatchEngine::new(config)?;
    engine.run().await
}
