//! 交易时段判定
//!
//! A股连续竞价时段的纯函数判定。窗口两端各放宽一分钟：
//! 早盘从09:24起（覆盖09:25集合竞价揭示），收盘延至15:00整分仍算在内。
//! 其他交易所接入时只需替换此处的窗口表。

use chrono::{DateTime, FixedOffset, NaiveTime, Timelike, Utc};

/// 交易所本地时区固定为东八区
const EXCHANGE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// 连续竞价窗口，半开区间 [开始, 结束)，以分钟精度表达
/// 09:24–11:31 与 13:00–15:01
const SESSION_WINDOWS: [((u32, u32), (u32, u32)); 2] = [((9, 24), (11, 31)), ((13, 0), (15, 1))];

/// 休市时循环粗睡眠的秒数
pub const CLOSED_RECHECK_SECS: u64 = 60;

/// 获取交易所本地当前时间
pub fn now_exchange() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(EXCHANGE_UTC_OFFSET_SECS).unwrap();
    Utc::now().with_timezone(&offset)
}

/// 判定给定钟面时间是否处于连续竞价窗口内
pub fn is_trading_time(t: NaiveTime) -> bool {
    let minute_of_day = t.hour() * 60 + t.minute();
    SESSION_WINDOWS.iter().any(|((sh, sm), (eh, em))| {
        let start = sh * 60 + sm;
        let end = eh * 60 + em;
        minute_of_day >= start && minute_of_day < end
    })
}

/// 当前是否处于交易时段
pub fn is_trading_now() -> bool {
    is_trading_time(now_exchange().time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_morning_window_boundaries() {
        assert!(!is_trading_time(at(9, 23)));
        assert!(is_trading_time(at(9, 24)));
        assert!(is_trading_time(at(9, 25)));
        assert!(is_trading_time(at(11, 30)));
        assert!(!is_trading_time(at(11, 31)));
    }

    #[test]
    fn test_afternoon_window_boundaries() {
        assert!(!is_trading_time(at(12, 59)));
        assert!(is_trading_time(at(13, 0)));
        assert!(is_trading_time(at(15, 0)));
        assert!(!is_trading_time(at(15, 1)));
    }

    #[test]
    fn test_lunch_break_and_overnight_closed() {
        assert!(!is_trading_time(at(12, 0)));
        assert!(!is_trading_time(at(0, 0)));
        assert!(!is_trading_time(at(20, 30)));
    }

    #[test]
    fn test_seconds_do_not_matter() {
        // 分钟精度判定，秒数不影响结果
        let t = NaiveTime::from_hms_opt(11, 30, 59).unwrap();
        assert!(is_trading_time(t));
    }
}
