//! 快轮询循环
//!
//! 每个周期对整个自选股列表发一次行情请求，逐品种类型化、并入滚动
//! 历史、派生信号并交给输出端。传输层失败放弃本轮，单品种字段异常
//! 只跳过该品种。

use crate::twcommon::{session, QuoteProvider, Symbol, TickSnapshot};
use crate::twwatch::reporter::Reporter;
use crate::twwatch::state::WatchState;
use crate::twwatch::{idle, CycleOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub struct TickPoller {
    provider: Arc<dyn QuoteProvider>,
    state: Arc<WatchState>,
    reporter: Arc<Reporter>,
    watchlist: Arc<Vec<Symbol>>,
    /// 自选股代码集合，用于过滤上游返回中的陌生代码
    watch_codes: HashSet<String>,
    interval: Duration,
    session_gate: fn() -> bool,
    shutdown: watch::Receiver<bool>,
}

impl TickPoller {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        state: Arc<WatchState>,
        reporter: Arc<Reporter>,
        watchlist: Arc<Vec<Symbol>>,
        interval_secs: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let watch_codes = watchlist.iter().map(|s| s.code.clone()).collect();
        Self {
            provider,
            state,
            reporter,
            watchlist,
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

    /// 执行一个周期：时段关闭时不触达上游、不改状态
    pub async fn cycle(&self) -> CycleOutcome {
        if !(self.session_gate)() {
            debug!("非交易时段，快循环空转");
            return CycleOutcome::Closed;
        }
        self.poll_once().await;
        CycleOutcome::Polled
    }

    /// 一次整表轮询
    async fn poll_once(&self) {
        let records = match self.provider.real(&self.watchlist).await {
            Ok(records) => records,
            Err(e) => {
                // 传输层失败：放弃本轮，循环照常按节奏继续
                error!("行情请求失败，放弃本轮: {}", e);
                return;
            }
        };

        let wall_time = session::now_exchange();
        let mut emitted = 0usize;

        // 处理顺序与上游响应一致
        for record in &records {
            if !self.watch_codes.contains(&record.code) {
                warn!("上游返回陌生代码，忽略: {}", record.code);
                continue;
            }

            let snapshot = match TickSnapshot::from_record(record, wall_time) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    // 单品种字段异常：跳过该品种，历史不动
                    warn!("品种字段异常，本轮跳过: {}", e);
                    continue;
                }
            };

            let row = self.state.ingest_tick(snapshot).await;
            let retail = self.state.retail_count(&row.snapshot.code).await;
            self.reporter.print_row(&row, retail);
            emitted += 1;
        }

        self.reporter.print_cycle_break();
        debug!("本轮输出 {}/{} 个品种", emitted, self.watchlist.len());
    }

    /// 循环入口，直到停止标志置位才返回
    pub async fn run(mut self) {
        info!(
            "快轮询循环启动，品种数: {}，间隔: {}秒",
            self.watchlist.len(),
            self.interval.as_secs()
        );

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

        info!("快轮询循环退出");
    }
}
