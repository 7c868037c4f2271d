//! 日志系统初始化
//!
//! 业务输出（盯盘行）走标准输出，日志走tracing，两者不混流。

use tracing_subscriber::EnvFilter;

/// 初始化tracing订阅者
///
/// 过滤级别优先取 RUST_LOG 环境变量，否则使用配置文件中的级别。
/// 压低reqwest/hyper的连接层噪音。
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=warn,reqwest=warn", log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
