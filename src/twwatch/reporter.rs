//! 盯盘行输出
//!
//! 每轮每品种一行写到标准输出，轮与轮之间打一条分隔线。
//! 只做格式化输出，不聚合、不落盘。

use crate::twcommon::DerivedRow;
use std::io::Write;
use std::sync::Mutex;

/// 输出端
pub struct Reporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    /// 输出到标准输出
    pub fn new() -> Self {
        Self {
            out: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// 输出到任意writer（测试捕获用）
    pub fn new_with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(writer),
        }
    }

    /// 打印一个品种的一行盯盘数据
    pub fn print_row(&self, row: &DerivedRow, retail_count: i64) {
        let snap = &row.snapshot;
        let gap = snap.last_price - snap.average_price;
        let gap_pct = if snap.average_price != 0.0 {
            gap / snap.average_price * 100.0
        } else {
            0.0
        };
        let level = if gap >= 0.0 { "HIGH" } else { "LOW" };
        let sell_mark = if row.signal_sell { "SELL" } else { "----" };
        let buy_mark = if row.signal_buy { "BUY" } else { "---" };

        let line = format!(
            "{} 现价:{:.2} 涨幅:{:+.2}% 量比:{:.2} 均价:{:.2} 窗口高:{:+.2} 窗口低:{:+.2} {} {} 笔数差:{} 散户:{} {} 价差:{:+.2} 价差%:{:+.2}%",
            snap.name,
            snap.last_price,
            snap.pct_change,
            snap.volume_ratio,
            snap.average_price,
            row.rolling_max_pct,
            row.rolling_min_pct,
            sell_mark,
            buy_mark,
            row.trade_delta,
            retail_count,
            level,
            gap,
            gap_pct,
        );

        let mut out = self.out.lock().unwrap();
        let _ = writeln!(out, "{}", line);
    }

    /// 打印轮次分隔线
    pub fn print_cycle_break(&self) {
        let mut out = self.out.lock().unwrap();
        let _ = writeln!(out, "{}", "-".repeat(96));
        let _ = out.flush();
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
