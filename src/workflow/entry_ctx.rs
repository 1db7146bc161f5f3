//! 条目处理上下文
//!
//! 封装"我正在处理第几轮的第几个条目"这一信息

use std::fmt::Display;

use crate::models::EntryId;

/// 条目处理上下文（仅用于日志显示）
#[derive(Debug, Clone)]
pub struct EntryCtx {
    /// 第几轮扫描（从1开始）
    pub pass: usize,
    /// 条目在本轮中的位置（从1开始）
    pub index: usize,
    /// 条目身份
    pub id: EntryId,
}

impl EntryCtx {
    pub fn new(pass: usize, index: usize, id: EntryId) -> Self {
        Self { pass, index, id }
    }
}

impl Display for EntryCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[第 {} 轮 #{} {}]", self.pass, self.index, self.id)
    }
}
