//! 盯盘服务配置模块

use crate::twcommon::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 系统配置常量
pub mod constants {
    /// 默认快轮询间隔（秒）
    pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 3;

    /// 默认散户指标轮询间隔（秒）
    pub const DEFAULT_RETAIL_INTERVAL_SECS: u64 = 30;

    /// 默认滚动窗口长度
    pub const DEFAULT_WINDOW_SIZE: usize = 100;

    /// 滚动窗口长度允许范围
    pub const WINDOW_SIZE_RANGE: (usize, usize) = (20, 500);

    /// 默认信号预热最小样本数
    pub const DEFAULT_WARMUP_MIN: usize = 10;

    /// 默认信号触发阈值（百分点）
    pub const DEFAULT_SIGNAL_THRESHOLD: f64 = 1.5;

    /// 慢轮询间隔至少为快轮询间隔的倍数
    pub const RETAIL_INTERVAL_MIN_RATIO: u64 = 10;
}

use constants::*;

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}

fn default_retail_interval() -> u64 {
    DEFAULT_RETAIL_INTERVAL_SECS
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_warmup_min() -> usize {
    DEFAULT_WARMUP_MIN
}

fn default_signal_threshold() -> f64 {
    DEFAULT_SIGNAL_THRESHOLD
}

fn default_price_source() -> String {
    "tencent".to_string()
}

fn default_symbol_table_path() -> String {
    "config/symbol_table.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 盯盘服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// 自选股显示名列表，顺序即轮询与输出顺序
    pub watchlist: Vec<String>,

    /// 快轮询间隔（秒）
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// 散户指标轮询间隔（秒），须不低于快轮询间隔的10倍
    #[serde(default = "default_retail_interval")]
    pub retail_interval_secs: u64,

    /// 滚动窗口长度W
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// 信号预热最小样本数F，历史不足时信号一律不触发
    #[serde(default = "default_warmup_min")]
    pub warmup_min: usize,

    /// 信号触发阈值（百分点）
    #[serde(default = "default_signal_threshold")]
    pub signal_threshold: f64,

    /// 行情后端标识
    #[serde(default = "default_price_source")]
    pub price_source: String,

    /// 静态品种表CSV路径
    #[serde(default = "default_symbol_table_path")]
    pub symbol_table_path: String,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl WatchConfig {
    /// 从TOML文件加载配置并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!(
                "无法读取配置文件 {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: WatchConfig = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("配置文件解析失败: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// 启动期校验，任何一项不满足都直接退出
    pub fn validate(&self) -> Result<()> {
        if self.watchlist.is_empty() {
            return Err(AppError::ConfigError("自选股列表为空".to_string()));
        }

        if self.tick_interval_secs < 1 {
            return Err(AppError::ConfigError(format!(
                "快轮询间隔必须不小于1秒: {}",
                self.tick_interval_secs
            )));
        }

        let min_retail = self.tick_interval_secs * RETAIL_INTERVAL_MIN_RATIO;
        if self.retail_interval_secs < min_retail {
            return Err(AppError::ConfigError(format!(
                "散户指标轮询间隔 {}秒 过短，须不低于快轮询间隔的{}倍（{}秒）",
                self.retail_interval_secs, RETAIL_INTERVAL_MIN_RATIO, min_retail
            )));
        }

        let (min_w, max_w) = WINDOW_SIZE_RANGE;
        if self.window_size < min_w || self.window_size > max_w {
            return Err(AppError::ConfigError(format!(
                "滚动窗口长度 {} 超出允许范围 [{}, {}]",
                self.window_size, min_w, max_w
            )));
        }

        if self.warmup_min < 2 {
            return Err(AppError::ConfigError(format!(
                "预热最小样本数必须不小于2: {}",
                self.warmup_min
            )));
        }

        if self.signal_threshold <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "信号阈值必须为正数: {}",
                self.signal_threshold
            )));
        }

        Ok(())
    }
}
