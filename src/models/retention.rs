//! 保留窗口

use chrono::{Duration, NaiveDateTime};

/// 保留截止时间
///
/// 比截止时间更新的条目会被跳过。窗口为 0 天时视为"不过滤"，
/// 此时没有时间戳的条目也允许处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionCutoff {
    point: NaiveDateTime,
    window_days: u32,
}

impl RetentionCutoff {
    /// 以 `now` 往前 `days` 天作为截止时间，超出可表示范围时取最早时间
    pub fn days_before(now: NaiveDateTime, days: u32) -> Self {
        let point = Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(NaiveDateTime::MIN);
        Self {
            point,
            window_days: days,
        }
    }

    /// 不过滤
    pub fn disabled(now: NaiveDateTime) -> Self {
        Self::days_before(now, 0)
    }

    pub fn point(&self) -> NaiveDateTime {
        self.point
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// 是否为"不过滤"哨兵值
    pub fn is_disabled(&self) -> bool {
        self.window_days == 0
    }

    /// 时间戳严格晚于截止时间时视为太新
    pub fn is_too_recent(&self, timestamp: NaiveDateTime) -> bool {
        timestamp > self.point
    }
}
