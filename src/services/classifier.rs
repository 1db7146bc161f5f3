//! 条目年龄判断 - 业务能力层
//!
//! 只负责"这个条目该不该处理"，不关心后续流程

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Selectors;
use crate::infrastructure::{Document, Locator};
use crate::models::{Entry, ErrorReason, RetentionCutoff, SkipReason};

/// 页面上时间戳的几种写法，统一空白之后依次尝试
const TIMESTAMP_FORMATS: [&str; 2] = ["%b %d, %Y %I:%M%p", "%B %d, %Y %I:%M%p"];

/// 判断结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Proceed,
    Skip(SkipReason),
    Error(ErrorReason),
}

/// 条目年龄判断服务
pub struct EntryClassifier {
    timestamp: Locator,
}

impl EntryClassifier {
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            timestamp: selectors.timestamp(),
        }
    }

    /// 读取条目的时间戳并判断是否在保留窗口之外
    ///
    /// 读到的原始文本和解析结果会写回 `entry`
    pub async fn classify(
        &self,
        document: &dyn Document,
        entry: &mut Entry,
        cutoff: &RetentionCutoff,
    ) -> Classification {
        let text = self.read_timestamp(document, entry).await;
        entry.timestamp = text.as_deref().and_then(parse_timestamp);
        if entry.timestamp.is_none() {
            if let Some(raw) = &text {
                warn!("无法解析时间戳文本: {:?}", raw);
            }
        }
        entry.timestamp_text = text;

        decide(entry.timestamp, cutoff)
    }

    async fn read_timestamp(&self, document: &dyn Document, entry: &Entry) -> Option<String> {
        let element = match document.find_first(&self.timestamp, Some(&entry.element)).await {
            Ok(Some(element)) => element,
            Ok(None) => return None,
            Err(e) => {
                debug!("查找时间戳元素失败: {}", e);
                return None;
            }
        };
        document.read_text(&element).await.unwrap_or_else(|e| {
            debug!("读取时间戳文本失败: {}", e);
            None
        })
    }
}

/// 根据时间戳和截止时间做决定
///
/// 没有时间戳时，只有在不过滤的情况下才允许处理
pub fn decide(timestamp: Option<NaiveDateTime>, cutoff: &RetentionCutoff) -> Classification {
    match timestamp {
        None if cutoff.is_disabled() => Classification::Proceed,
        None => Classification::Error(ErrorReason::NoTimestamp),
        Some(ts) if cutoff.is_too_recent(ts) => Classification::Skip(SkipReason::TooRecent),
        Some(_) => Classification::Proceed,
    }
}

/// 解析页面上的时间戳文本，例如 `Mar 15, 2020 10:30pm`
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let normalized = normalize(text);
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
}

fn normalize(text: &str) -> String {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    static AT: OnceLock<Regex> = OnceLock::new();
    static AMPM: OnceLock<Regex> = OnceLock::new();

    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("合法正则"));
    let at = AT.get_or_init(|| Regex::new(r"(?i)\s+at\s+").expect("合法正则"));
    let ampm = AMPM.get_or_init(|| Regex::new(r"(?i)\s+([ap]m)$").expect("合法正则"));

    let collapsed = spaces.replace_all(text.trim(), " ");
    let without_at = at.replace_all(&collapsed, " ");
    ampm.replace(&without_at, "$1").into_owned()
}
