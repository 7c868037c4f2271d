//! 慢轮询循环（散户指标）
//!
//! 对第二数据源发自然语言查询，按显示名解析回代码后整批覆盖散户数量
//! 表。该上游限频严格，节奏必须比快循环低一个数量级，失败也不在周期
//! 内重试。

use crate::twcommon::{session, RetailProvider, Symbol, SymbolRegistry};
use crate::twwatch::state::WatchState;
use crate::twwatch::{idle, CycleOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

pub struct RetailPoller {
    provider: Arc<dyn RetailProvider>,
    state: Arc<WatchState>,
    registry: Arc<SymbolRegistry>,
    /// 查询问句，启动时由自选股显示名拼好
    question: String,
    /// 自选股代码集合，散户表只收自选股
    watch_codes: HashSet<String>,
    interval: Duration,
    session_gate: fn() -> bool,
    shutdown: watch::Receiver<bool>,
}

impl RetailPoller {
    pub fn new(
        provider: Arc<dyn RetailProvider>,
        state: Arc<WatchState>,
        registry: Arc<SymbolRegistry>,
        watchlist: &[Symbol],
        interval_secs: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let names: Vec<&str> = watchlist.iter().map(|s| s.display_name.as_str()).collect();
        let question = format!("{} 散户指标", names.join(" "));
        let watch_codes = watchlist.iter().map(|s| s.code.clone()).collect();
        Self {
            provider,
            state,
            registry,
            question,
            watch_codes,
            interval: Duration::from_secs(interval_secs),
            session_gate: session::is_trading_now,
            shutdown,
        }
    }

    /// 测试注入用：替换交易时段判定
    pub fn with_session_gate(mut self, gate: fn() -> bool) -> Self {
        self.session_gate = gate;
        self
    }

    /// 执行一个周期
    pub async fn cycle(&self) -> CycleOutcome {
        if !(self.session_gate)() {
            debug!("非交易时段，慢循环空转");
            return CycleOutcome::Closed;
        }
        self.poll_once().await;
        CycleOutcome::Polled
    }

    /// 一次散户指标查询
    async fn poll_once(&self) {
        let rows = match self.provider.query(&self.question).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("散户指标查询失败，放弃本轮: {}", e);
                return;
            }
        };

        // 名字解析不出或不在自选股内的行静默丢弃
        let entries: Vec<(String, i64)> = rows
            .iter()
            .filter_map(|row| {
                let code = self.registry.name_to_code(&row.name)?;
                if !self.watch_codes.contains(code) {
                    return None;
                }
                Some((code.to_string(), row.holder_count))
            })
            .collect();

        debug!("散户指标更新 {}/{} 行", entries.len(), rows.len());
        self.state.set_retail_counts(entries).await;
    }

    /// 循环入口，直到停止标志置位才返回
    pub async fn run(mut self) {
        info!("慢轮询循环启动，间隔: {}秒", self.interval.as_secs());

        loop {
            if *self.shutdown.borrow() {
                break;
            }
            let pause = match self.cycle().await {
                CycleOutcome::Closed => Duration::from_secs(session::CLOSED_RECHECK_SECS),
                CycleOutcome::Polled => self.interval,
            };
            if idle(&mut self.shutdown, pause).await {
                break;
            }
        }

        info!("慢轮询循环退出");
    }
}
