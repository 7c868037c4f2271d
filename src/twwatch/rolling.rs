//! 单品种滚动历史与信号派生
//!
//! 历史为定长滑动窗口，追加时淘汰最旧行。窗口极值在追加时一次归约算出
//! （含新行）：对已截窗的序列再做滚动归约与直接取窗口极值等价，因此
//! 这里只做单次归约。

use crate::twcommon::{DerivedRow, TickSnapshot, WatchConfig};
use std::collections::VecDeque;

/// 信号参数，来自配置
#[derive(Debug, Clone, Copy)]
pub struct SignalParams {
    /// 窗口长度W
    pub window: usize,
    /// 预热最小样本数F，窗口（含新行）不超过F时信号一律不触发
    pub warmup: usize,
    /// 触发阈值（百分点），比较用 >=
    pub threshold: f64,
}

impl From<&WatchConfig> for SignalParams {
    fn from(config: &WatchConfig) -> Self {
        Self {
            window: config.window_size,
            warmup: config.warmup_min,
            threshold: config.signal_threshold,
        }
    }
}

/// 单品种滚动历史
#[derive(Debug)]
pub struct RollingHistory {
    params: SignalParams,
    rows: VecDeque<DerivedRow>,
}

impl RollingHistory {
    pub fn new(params: SignalParams) -> Self {
        Self {
            params,
            rows: VecDeque::with_capacity(params.window),
        }
    }

    /// 追加一条快照，计算派生列并返回完整行
    ///
    /// 信号语义：窗口高点回撤达到阈值 -> 卖出；相对窗口低点上行达到
    /// 阈值 -> 买入。两者可同轮触发。
    pub fn append(&mut self, snapshot: TickSnapshot, trade_delta: i64) -> DerivedRow {
        if self.rows.len() == self.params.window {
            self.rows.pop_front();
        }

        let pct_now = snapshot.pct_change;
        let mut rolling_max = pct_now;
        let mut rolling_min = pct_now;
        for row in &self.rows {
            let pct = row.snapshot.pct_change;
            if pct > rolling_max {
                rolling_max = pct;
            }
            if pct < rolling_min {
                rolling_min = pct;
            }
        }

        let filled = self.rows.len() + 1;
        let (signal_buy, signal_sell) = if filled <= self.params.warmup {
            // 预热期，样本不足时不出信号
            (false, false)
        } else {
            (
                pct_now - rolling_min >= self.params.threshold,
                rolling_max - pct_now >= self.params.threshold,
            )
        };

        let row = DerivedRow {
            snapshot,
            rolling_max_pct: rolling_max,
            rolling_min_pct: rolling_min,
            signal_buy,
            signal_sell,
            trade_delta,
        };
        self.rows.push_back(row.clone());
        row
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 最新一行
    pub fn latest(&self) -> Option<&DerivedRow> {
        self.rows.back()
    }

    /// 按追加顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &DerivedRow> {
        self.rows.iter()
    }
}
