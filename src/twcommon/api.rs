//! 行情与散户指标接口客户端
//!
//! 两个上游都以trait注入，信号逻辑与轮询循环可离线测试。
//! 具体实现：腾讯行情接口（整表一次请求）与问财机器人接口（自然语言查询）。

use crate::twcommon::{AppError, QuoteRecord, RetailRow, Result, Symbol};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 行情数据源，一次调用返回整个自选股列表的最新快照
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn real(&self, symbols: &[Symbol]) -> Result<Vec<QuoteRecord>>;
}

/// 散户指标数据源，接受自然语言问句，返回表格行
///
/// 该接口限频严格，只允许慢节奏调用
#[async_trait]
pub trait RetailProvider: Send + Sync {
    async fn query(&self, question: &str) -> Result<Vec<RetailRow>>;
}

/// 按配置的后端标识构造行情客户端
pub fn build_quote_provider(price_source: &str) -> Result<Arc<dyn QuoteProvider>> {
    match price_source {
        "tencent" => Ok(Arc::new(TencentQuoteApi::new())),
        other => Err(AppError::ConfigError(format!(
            "未知行情后端: {}",
            other
        ))),
    }
}

/// 创建带超时设置的HTTP客户端（禁用连接池，避免复用陈旧连接）
fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| AppError::ApiError(format!("创建HTTP客户端失败: {}", e)))
}

/// 腾讯行情API客户端
#[derive(Clone, Debug)]
pub struct TencentQuoteApi {
    api_url: String,
}

impl TencentQuoteApi {
    pub fn new() -> Self {
        Self {
            api_url: "https://qt.gtimg.cn".to_string(),
        }
    }

    pub fn new_with_url(api_url: String) -> Self {
        Self { api_url }
    }
}

impl Default for TencentQuoteApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for TencentQuoteApi {
    async fn real(&self, symbols: &[Symbol]) -> Result<Vec<QuoteRecord>> {
        let list = symbols
            .iter()
            .map(|s| s.wire_code())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/q={}", self.api_url, list);

        let client = create_client()?;
        debug!(target: "api", "发送行情请求: {}", url);

        let response = client
            .get(&url)
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(target: "api", "行情请求返回异常状态: {}", status);
            return Err(AppError::ApiError(format!(
                "行情接口返回异常状态: {}",
                status
            )));
        }

        // 接口以GBK编码返回
        let body = response.text_with_charset("gbk").await?;
        Ok(parse_tencent_body(&body))
    }
}

/// 解析腾讯行情整包响应
///
/// 单品种字段异常只丢弃该品种并告警，不影响同批其他品种
pub fn parse_tencent_body(body: &str) -> Vec<QuoteRecord> {
    let mut records = Vec::new();
    for segment in body.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match parse_tencent_record(segment) {
            Ok(record) => records.push(record),
            Err(e) => warn!(target: "api", "行情记录解析失败，跳过该品种: {}", e),
        }
    }
    records
}

/// 腾讯行情记录的字段下标（以 '~' 分隔）
mod tencent_fields {
    pub const NAME: usize = 1;
    pub const CODE: usize = 2;
    pub const LAST_PRICE: usize = 3;
    pub const PCT_CHANGE: usize = 32;
    pub const PRICE_VOLUME_AMOUNT: usize = 35;
    pub const CUMULATIVE_VOLUME: usize = 36;
    pub const CUMULATIVE_AMOUNT: usize = 37;
    pub const VOLUME_RATIO: usize = 49;
    pub const AVERAGE_PRICE: usize = 51;
    /// 记录至少要有这么多字段才可用
    pub const MIN_FIELDS: usize = 52;
}

/// 解析单条 `v_sh600000="..."` 形式的行情记录
fn parse_tencent_record(segment: &str) -> Result<QuoteRecord> {
    use tencent_fields::*;

    let (_, rest) = segment
        .split_once("=\"")
        .ok_or_else(|| AppError::DataError(format!("行情记录格式异常: {}", segment)))?;
    let inner = rest.trim_end_matches('"');

    let fields: Vec<&str> = inner.split('~').collect();
    if fields.len() < MIN_FIELDS {
        return Err(AppError::DataError(format!(
            "行情记录字段不足: 期望至少{}个，实际{}个",
            MIN_FIELDS,
            fields.len()
        )));
    }

    let parse_f64 = |idx: usize, label: &str| -> Result<f64> {
        fields[idx].trim().parse::<f64>().map_err(|_| {
            AppError::ParseError(format!(
                "{} 字段 {} 无法解析为数值: {}",
                fields[CODE], label, fields[idx]
            ))
        })
    };
    let parse_i64 = |idx: usize, label: &str| -> Result<i64> {
        fields[idx].trim().parse::<i64>().map_err(|_| {
            AppError::ParseError(format!(
                "{} 字段 {} 无法解析为整数: {}",
                fields[CODE], label, fields[idx]
            ))
        })
    };

    Ok(QuoteRecord {
        code: fields[CODE].to_string(),
        name: fields[NAME].to_string(),
        last_price: parse_f64(LAST_PRICE, "最新价")?,
        pct_change: parse_f64(PCT_CHANGE, "涨跌幅")?,
        volume_ratio: parse_f64(VOLUME_RATIO, "量比")?,
        average_price: parse_f64(AVERAGE_PRICE, "均价")?,
        price_volume_amount: fields[PRICE_VOLUME_AMOUNT].to_string(),
        cumulative_volume: parse_i64(CUMULATIVE_VOLUME, "成交量")?,
        cumulative_amount: parse_f64(CUMULATIVE_AMOUNT, "成交额")?,
    })
}

/// 问财机器人接口客户端
#[derive(Clone, Debug)]
pub struct WencaiRetailApi {
    api_url: String,
}

impl WencaiRetailApi {
    pub fn new() -> Self {
        Self {
            api_url: "http://www.iwencai.com/customized/chart/get-robot-data".to_string(),
        }
    }

    pub fn new_with_url(api_url: String) -> Self {
        Self { api_url }
    }
}

impl Default for WencaiRetailApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetailProvider for WencaiRetailApi {
    async fn query(&self, question: &str) -> Result<Vec<RetailRow>> {
        let client = create_client()?;
        debug!(target: "api", "发送散户指标查询: {}", question);

        let body = serde_json::json!({
            "question": question,
            "perpage": 100,
            "page": 1,
            "query_type": "stock",
        });

        let response = client
            .post(&self.api_url)
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(target: "api", "散户指标请求返回异常状态: {}", status);
            return Err(AppError::ApiError(format!(
                "散户指标接口返回异常状态: {}",
                status
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        Ok(parse_wencai_rows(&payload))
    }
}

/// 从问财响应中提取表格行
///
/// 响应首个组件即表格数据；行缺少名称或数量列时静默丢弃
pub fn parse_wencai_rows(payload: &serde_json::Value) -> Vec<RetailRow> {
    let datas = payload
        .pointer("/data/answer/0/txt/0/content/components/0/data/datas")
        .and_then(|v| v.as_array());

    let rows = match datas {
        Some(rows) => rows,
        None => {
            debug!(target: "api", "散户指标响应中未找到表格数据");
            return Vec::new();
        }
    };

    rows.iter()
        .filter_map(|row| {
            let name = row.get("名称")?.as_str()?.to_string();
            let holder_count = extract_count(row.get("dde散户数量")?)?;
            Some(RetailRow { name, holder_count })
        })
        .collect()
}

/// 数量列可能是数字也可能是字符串，两种都接受
fn extract_count(value: &serde_json::Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64() {
        return Some(f as i64);
    }
    value.as_str()?.trim().parse::<f64>().ok().map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一条指定下标字段的腾讯行情记录
    fn make_segment(overrides: &[(usize, &str)]) -> String {
        let mut fields: Vec<String> = (0..60).map(|i| i.to_string()).collect();
        fields[tencent_fields::NAME] = "浦发银行".to_string();
        fields[tencent_fields::CODE] = "600000".to_string();
        fields[tencent_fields::LAST_PRICE] = "7.20".to_string();
        fields[tencent_fields::PCT_CHANGE] = "1.69".to_string();
        fields[tencent_fields::PRICE_VOLUME_AMOUNT] = "7.20/123456/88888".to_string();
        fields[tencent_fields::CUMULATIVE_VOLUME] = "123456".to_string();
        fields[tencent_fields::CUMULATIVE_AMOUNT] = "88888.0".to_string();
        fields[tencent_fields::VOLUME_RATIO] = "0.98".to_string();
        fields[tencent_fields::AVERAGE_PRICE] = "7.15".to_string();
        for (idx, value) in overrides {
            fields[*idx] = value.to_string();
        }
        format!("v_sh600000=\"{}\"", fields.join("~"))
    }

    #[test]
    fn test_parse_tencent_record_roundtrip() {
        let body = format!("{};\n", make_segment(&[]));
        let records = parse_tencent_body(&body);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.code, "600000");
        assert_eq!(r.name, "浦发银行");
        assert_eq!(r.last_price, 7.20);
        assert_eq!(r.pct_change, 1.69);
        assert_eq!(r.volume_ratio, 0.98);
        assert_eq!(r.average_price, 7.15);
        assert_eq!(r.cumulative_volume, 123456);
        assert_eq!(r.price_volume_amount, "7.20/123456/88888");
    }

    #[test]
    fn test_bad_record_does_not_poison_batch() {
        let good = make_segment(&[]);
        let bad = make_segment(&[(tencent_fields::LAST_PRICE, "not-a-number")]);
        let body = format!("{};{};", bad, good);
        let records = parse_tencent_body(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "600000");
    }

    #[test]
    fn test_short_record_rejected() {
        let body = "v_sh600000=\"1~浦发银行~600000~7.20\";";
        assert!(parse_tencent_body(body).is_empty());
    }

    #[test]
    fn test_parse_wencai_rows() {
        let payload = serde_json::json!({
            "data": { "answer": [ { "txt": [ { "content": { "components": [ {
                "data": { "datas": [
                    { "名称": "浦发银行", "dde散户数量": 123456 },
                    { "名称": "万科A", "dde散户数量": "23456.7" },
                    { "名称": "缺数量的行" },
                    { "dde散户数量": 99 }
                ] }
            } ] } } ] } ] }
        });
        let rows = parse_wencai_rows(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "浦发银行");
        assert_eq!(rows[0].holder_count, 123456);
        assert_eq!(rows[1].holder_count, 23456);
    }

    #[test]
    fn test_parse_wencai_empty_payload() {
        let payload = serde_json::json!({ "data": {} });
        assert!(parse_wencai_rows(&payload).is_empty());
    }

    #[test]
    fn test_unknown_price_source_rejected() {
        assert!(build_quote_provider("sina").is_err());
        assert!(build_quote_provider("tencent").is_ok());
    }
}
