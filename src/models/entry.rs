//! 动态条目

use std::fmt::{self, Display};

use chrono::NaiveDateTime;

use crate::infrastructure::ElementHandle;

/// 条目身份
///
/// 用于去重，与条目在列表中的位置无关，并且在页面重新加载后保持不变
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ElementHandle> for EntryId {
    fn from(handle: &ElementHandle) -> Self {
        Self(handle.as_str().to_string())
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 动态列表中的一个条目
///
/// 每次扫描时重新发现；除了身份被记录在 `HandledSet` 中以外，不跨扫描保留。
/// `element` 只在当前页面加载内有效，`id` 跨页面加载有效。
#[derive(Debug, Clone)]
pub struct Entry {
    /// 稳定身份
    pub id: EntryId,
    /// 条目根元素
    pub element: ElementHandle,
    /// 原始时间戳文本
    pub timestamp_text: Option<String>,
    /// 解析后的时间点
    pub timestamp: Option<NaiveDateTime>,
}

impl Entry {
    pub fn new(id: EntryId, element: ElementHandle) -> Self {
        Self {
            id,
            element,
            timestamp_text: None,
            timestamp: None,
        }
    }
}
