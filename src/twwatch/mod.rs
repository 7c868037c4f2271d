//! 盯盘引擎：两条独立轮询循环 + 单写者共享状态

pub mod engine;
pub mod reporter;
pub mod retail_poller;
pub mod rolling;
pub mod state;
pub mod tick_poller;


pub use engine::WatchEngine;
pub use reporter::Reporter;
pub use retail_poller::RetailPoller;
pub use rolling::{RollingHistory, SignalParams};
pub use state::WatchState;
pub use tick_poller::TickPoller;

use std::time::Duration;
use tokio::sync::watch;

/// 一个周期的结果，决定下一次睡眠时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 非交易时段，粗睡眠后再查
    Closed,
    /// 完成了一次轮询（成败均按正常节奏继续）
    Polled,
}

/// 周期间睡眠，停止标志置位时提前醒来
///
/// 返回true表示应当退出循环
pub(crate) async fn idle(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => *shutdown.borrow(),
        changed = shutdown.changed() => match changed {
            Ok(()) => *shutdown.borrow(),
            // 发送端已销毁，视同停止
            Err(_) => true,
        },
    }
}
