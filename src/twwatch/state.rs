//! 进程内共享状态
//!
//! 三个子表各自只有一个写者：快轮询循环写滚动历史与笔数游标，
//! 慢轮询循环写散户数量表，输出端只读。锁只在整值替换期间短暂持有。

use crate::twcommon::{DerivedRow, TickSnapshot};
use crate::twwatch::rolling::{RollingHistory, SignalParams};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

/// 盯盘共享状态
pub struct WatchState {
    params: SignalParams,
    /// code -> 滚动历史（快循环独写）
    tick: RwLock<HashMap<String, RollingHistory>>,
    /// code -> 最近一次散户数量（慢循环独写）
    retail: RwLock<HashMap<String, i64>>,
    /// code -> 上一轮累计成交笔数（快循环独写）
    trade_cursor: RwLock<HashMap<String, i64>>,
}

impl WatchState {
    pub fn new(params: SignalParams) -> Self {
        Self {
            params,
            tick: RwLock::new(HashMap::new()),
            retail: RwLock::new(HashMap::new()),
            trade_cursor: RwLock::new(HashMap::new()),
        }
    }

    /// 快循环入口：推进笔数游标并把快照并入滚动历史，返回派生行
    pub async fn ingest_tick(&self, snapshot: TickSnapshot) -> DerivedRow {
        let trade_delta = self
            .advance_trade_cursor(&snapshot.code, snapshot.cumulative_trades)
            .await;

        let mut tick = self.tick.write().await;
        let history = tick
            .entry(snapshot.code.clone())
            .or_insert_with(|| RollingHistory::new(self.params));
        history.append(snapshot, trade_delta)
    }

    /// 推进累计成交笔数游标，返回与上一轮的差值
    ///
    /// 首次观测为0；上游理应单调，观测到回退时告警并按0处理
    async fn advance_trade_cursor(&self, code: &str, cumulative_trades: i64) -> i64 {
        let mut cursor = self.trade_cursor.write().await;
        let delta = match cursor.get(code) {
            None => 0,
            Some(&prev) => {
                let delta = cumulative_trades - prev;
                if delta < 0 {
                    warn!("{} 累计成交笔数回退: {} -> {}，本轮按0处理", code, prev, cumulative_trades);
                    0
                } else {
                    delta
                }
            }
        };
        cursor.insert(code.to_string(), cumulative_trades);
        delta
    }

    /// 读取品种的最近散户数量，缺失按0
    pub async fn retail_count(&self, code: &str) -> i64 {
        self.retail.read().await.get(code).copied().unwrap_or(0)
    }

    /// 慢循环入口：整批覆盖散户数量，未出现的品种保留旧值
    pub async fn set_retail_counts(&self, entries: Vec<(String, i64)>) {
        if entries.is_empty() {
            return;
        }
        let mut retail = self.retail.write().await;
        for (code, count) in entries {
            retail.insert(code, count);
        }
    }

    /// 品种滚动历史当前长度
    pub async fn history_len(&self, code: &str) -> usize {
        self.tick
            .read()
            .await
            .get(code)
            .map(|h| h.len())
            .unwrap_or(0)
    }

    /// 品种最新派生行
    pub async fn latest_row(&self, code: &str) -> Option<DerivedRow> {
        self.tick
            .read()
            .await
            .get(code)
            .and_then(|h| h.latest().cloned())
    }
}
