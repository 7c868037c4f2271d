use crate::twcommon::{AppError, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 交易所市场标记（沪/深）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    /// 上海证券交易所
    Sh,
    /// 深圳证券交易所
    Sz,
}

impl Market {
    /// 从ts_code后缀解析市场，例如 "600000.SH" 的 "SH"
    pub fn from_suffix(suffix: &str) -> Result<Self> {
        match suffix.to_ascii_uppercase().as_str() {
            "SH" => Ok(Market::Sh),
            "SZ" => Ok(Market::Sz),
            other => Err(AppError::ParseError(format!("未知市场后缀: {}", other))),
        }
    }

    /// 行情接口使用的小写市场前缀，例如 "sh600000"
    pub fn wire_prefix(&self) -> &'static str {
        match self {
            Market::Sh => "sh",
            Market::Sz => "sz",
        }
    }
}

/// 自选股品种
///
/// 启动时由注册表解析生成，会话期间不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// 中文显示名，例如 "浦发银行"
    pub display_name: String,
    /// 纯数字代码，例如 "600000"
    pub code: String,
    /// 市场标记
    pub market: Market,
}

impl Symbol {
    /// 行情接口使用的带前缀代码，例如 "sh600000"
    pub fn wire_code(&self) -> String {
        format!("{}{}", self.market.wire_prefix(), self.code)
    }
}

/// 行情接口返回的单品种原始记录（字段已做数值化，复合字段保留原文）
#[derive(Debug, Clone)]
pub struct QuoteRecord {
    /// 纯数字代码
    pub code: String,
    /// 显示名
    pub name: String,
    /// 最新价
    pub last_price: f64,
    /// 涨跌幅（百分比数值）
    pub pct_change: f64,
    /// 量比
    pub volume_ratio: f64,
    /// 均价
    pub average_price: f64,
    /// 复合字段 "价格/成交量/成交额"，以 '/' 分隔
    pub price_volume_amount: String,
    /// 累计成交量（手）
    pub cumulative_volume: i64,
    /// 累计成交额（万元）
    pub cumulative_amount: f64,
}

/// 单品种一次轮询的快照，所有字段已类型化
///
/// 复合字段在此处拆分，下游只见类型化字段
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    pub code: String,
    pub name: String,
    pub wall_time: DateTime<FixedOffset>,
    pub last_price: f64,
    pub pct_change: f64,
    pub volume_ratio: f64,
    pub average_price: f64,
    /// 自开盘以来的累计成交笔数，取自复合字段的中段
    pub cumulative_trades: i64,
    pub cumulative_amount: f64,
}

impl TickSnapshot {
    /// 从原始行情记录构造快照
    ///
    /// 复合字段格式不符时返回错误，调用方跳过该品种、保留历史
    pub fn from_record(record: &QuoteRecord, wall_time: DateTime<FixedOffset>) -> Result<Self> {
        let parts: Vec<&str> = record.price_volume_amount.split('/').collect();
        if parts.len() < 3 {
            return Err(AppError::DataError(format!(
                "{} 复合字段格式异常: {}",
                record.code, record.price_volume_amount
            )));
        }

        let cumulative_trades: i64 = parts[1].trim().parse().map_err(|_| {
            AppError::ParseError(format!(
                "{} 复合字段成交笔数无法解析: {}",
                record.code, parts[1]
            ))
        })?;

        Ok(Self {
            code: record.code.clone(),
            name: record.name.clone(),
            wall_time,
            last_price: record.last_price,
            pct_change: record.pct_change,
            volume_ratio: record.volume_ratio,
            average_price: record.average_price,
            cumulative_trades,
            cumulative_amount: record.cumulative_amount,
        })
    }
}

/// 快照附加滚动派生列后的完整行
#[derive(Debug, Clone)]
pub struct DerivedRow {
    pub snapshot: TickSnapshot,
    /// 窗口内（含当前行）涨跌幅最大值
    pub rolling_max_pct: f64,
    /// 窗口内（含当前行）涨跌幅最小值
    pub rolling_min_pct: f64,
    /// 相对窗口低点上行超过阈值
    pub signal_buy: bool,
    /// 相对窗口高点回撤超过阈值
    pub signal_sell: bool,
    /// 本轮与上轮累计成交笔数之差，首轮为0
    pub trade_delta: i64,
}

/// 散户指标接口返回的单行数据
#[derive(Debug, Clone)]
pub struct RetailRow {
    /// 显示名（与注册表名称一致才会被采纳）
    pub name: String,
    /// dde散户数量
    pub holder_count: i64,
}
