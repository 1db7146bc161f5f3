//! 运行期记账：已处理集合与计数器

use std::collections::HashSet;

use crate::models::entry::EntryId;
use crate::models::outcome::Outcome;

/// 本次运行中已经处理过的条目身份
///
/// 身份在第一次遇到时立即记录，之后任何步骤失败也不会再被处理
#[derive(Debug, Default, Clone)]
pub struct HandledSet {
    ids: HashSet<EntryId>,
}

impl HandledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录身份，第一次记录返回 `true`，已存在返回 `false`
    pub fn insert(&mut self, id: &EntryId) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.clone())
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// 删除/隐藏计数，只增不减
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    deleted: usize,
    hidden: usize,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted(&self) -> usize {
        self.deleted
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// 删除与隐藏的总数
    pub fn total(&self) -> usize {
        self.deleted + self.hidden
    }

    /// 根据最终结果更新计数，只有删除和隐藏会增加
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Deleted => self.deleted += 1,
            Outcome::Hidden => self.hidden += 1,
            Outcome::Skipped(_) | Outcome::Errored(_) => {}
        }
    }
}

/// 跳过/错误数量，只用于最终统计
#[derive(Debug, Default, Clone, Copy)]
pub struct SideStats {
    pub skipped: usize,
    pub errored: usize,
}

impl SideStats {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Errored(_) => self.errored += 1,
            Outcome::Deleted | Outcome::Hidden => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::{ErrorReason, SkipReason};

    #[test]
    fn identity_is_recorded_once() {
        let mut handled = HandledSet::new();
        let id = EntryId::new("abc-1");
        assert!(handled.insert(&id));
        assert!(!handled.insert(&id));
        assert_eq!(handled.len(), 1);
        assert!(handled.contains(&id));
    }

    #[test]
    fn counters_increment_exclusively() {
        let mut counters = Counters::new();
        counters.record(Outcome::Deleted);
        counters.record(Outcome::Hidden);
        counters.record(Outcome::Hidden);
        counters.record(Outcome::Skipped(SkipReason::TooRecent));
        counters.record(Outcome::Errored(ErrorReason::ConfirmationTimeout));
        assert_eq!(counters.deleted(), 1);
        assert_eq!(counters.hidden(), 2);
        assert_eq!(counters.total(), 3);
    }
}
