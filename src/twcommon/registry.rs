//! 品种注册表
//!
//! 启动时从静态CSV表一次性加载显示名与代码的双向映射，会话期间不刷新。
//! 表至少包含 `name` 与 `ts_code` 两列，ts_code 为带市场后缀的点分代码，
//! 例如 `600000.SH`。

use crate::twcommon::{AppError, Market, Result, Symbol};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// CSV行结构，多余列自动忽略
#[derive(Debug, Deserialize)]
struct SymbolRow {
    name: String,
    ts_code: String,
}

/// 品种注册表，加载后查询为O(1)
#[derive(Debug)]
pub struct SymbolRegistry {
    by_name: HashMap<String, Symbol>,
    code_to_name: HashMap<String, String>,
}

impl SymbolRegistry {
    /// 从CSV文件加载注册表
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::ConfigError(format!(
                "品种表文件不存在: {}",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut by_name = HashMap::new();
        let mut code_to_name = HashMap::new();

        for row in reader.deserialize::<SymbolRow>() {
            let row = row?;
            let symbol = Self::parse_ts_code(&row.name, &row.ts_code)?;
            code_to_name.insert(symbol.code.clone(), symbol.display_name.clone());
            by_name.insert(row.name, symbol);
        }

        info!("品种表加载完成，共 {} 个品种: {}", by_name.len(), path.display());

        Ok(Self {
            by_name,
            code_to_name,
        })
    }

    /// 解析点分代码，例如 "600000.SH" -> (600000, 沪市)
    fn parse_ts_code(name: &str, ts_code: &str) -> Result<Symbol> {
        let (code, suffix) = ts_code.split_once('.').ok_or_else(|| {
            AppError::ParseError(format!("{} 的代码缺少市场后缀: {}", name, ts_code))
        })?;

        Ok(Symbol {
            display_name: name.to_string(),
            code: code.to_string(),
            market: Market::from_suffix(suffix)?,
        })
    }

    /// 将显示名序列解析为品种序列，顺序保持一致
    ///
    /// 任何一个名字不在表中都视为配置错误，启动直接失败
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Symbol>> {
        names
            .iter()
            .map(|name| {
                self.by_name
                    .get(name)
                    .cloned()
                    .ok_or_else(|| AppError::ConfigError(format!("未知品种: {}", name)))
            })
            .collect()
    }

    /// 显示名 -> 纯数字代码
    pub fn name_to_code(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|s| s.code.as_str())
    }

    /// 纯数字代码 -> 显示名
    pub fn code_to_name(&self, code: &str) -> Option<&str> {
        self.code_to_name.get(code).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 每个测试用独立文件名，避免并行测试互相覆盖
    fn write_table(tag: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tick_server_registry_{}_{}.csv",
            tag,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_and_resolve() {
        let path = write_table("resolve", "name,ts_code\n浦发银行,600000.SH\n万科A,000002.SZ\n");
        let registry = SymbolRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);

        let symbols = registry
            .resolve(&["万科A".to_string(), "浦发银行".to_string()])
            .unwrap();
        assert_eq!(symbols[0].code, "000002");
        assert_eq!(symbols[0].market, Market::Sz);
        assert_eq!(symbols[0].wire_code(), "sz000002");
        assert_eq!(symbols[1].wire_code(), "sh600000");

        // 双向映射往返
        assert_eq!(registry.name_to_code("浦发银行"), Some("600000"));
        assert_eq!(registry.code_to_name("600000"), Some("浦发银行"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unknown_symbol_is_config_error() {
        let path = write_table("unknown", "name,ts_code\n浦发银行,600000.SH\n");
        let registry = SymbolRegistry::load(&path).unwrap();
        let err = registry.resolve(&["不存在的票".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SymbolRegistry::load("/nonexistent/symbols.csv").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_bad_ts_code_rejected() {
        let path = write_table("badcode", "name,ts_code\n坏数据,600000\n");
        assert!(SymbolRegistry::load(&path).is_err());
        std::fs::remove_file(path).ok();
    }
}
