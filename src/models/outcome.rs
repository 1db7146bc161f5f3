//! 清除动作与处理结果

use std::fmt::{self, Display};

use crate::config::Palette;

/// 清除动作
///
/// 变体顺序就是解析优先级：删除优先于隐藏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurgeAction {
    /// 删除
    Delete,
    /// 从时间线隐藏
    Hide,
}

impl PurgeAction {
    /// 按优先级排列的全部动作
    pub const PRIORITY: [PurgeAction; 2] = [PurgeAction::Delete, PurgeAction::Hide];

    /// 菜单中用于识别该动作的文本
    pub fn marker(self) -> &'static str {
        match self {
            PurgeAction::Delete => "Delete",
            PurgeAction::Hide => "Hidden from timeline",
        }
    }

    /// 该动作对应的标记颜色
    pub fn color(self, palette: &Palette) -> &str {
        match self {
            PurgeAction::Delete => &palette.delete,
            PurgeAction::Hide => &palette.hide,
        }
    }

    /// 动作成功后的结果
    pub fn outcome(self) -> Outcome {
        match self {
            PurgeAction::Delete => Outcome::Deleted,
            PurgeAction::Hide => Outcome::Hidden,
        }
    }
}

impl Display for PurgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurgeAction::Delete => write!(f, "删除"),
            PurgeAction::Hide => write!(f, "隐藏"),
        }
    }
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// 条目比保留截止时间更新
    TooRecent,
}

/// 结构性错误原因，只终止当前条目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// 启用了年龄过滤但条目没有可用的时间戳
    NoTimestamp,
    /// 找不到（或无法点开）条目的菜单按钮
    NoMenuButton,
    /// 菜单中没有删除或隐藏选项
    NoPurgeButton,
    /// 确认对话框的按钮始终没有出现
    ConfirmationTimeout,
}

impl Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorReason::NoTimestamp => "未找到时间戳",
            ErrorReason::NoMenuButton => "未找到菜单按钮",
            ErrorReason::NoPurgeButton => "未找到删除/隐藏选项",
            ErrorReason::ConfirmationTimeout => "确认按钮始终没有出现",
        };
        f.write_str(msg)
    }
}

/// 单个条目的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Deleted,
    Hidden,
    Skipped(SkipReason),
    Errored(ErrorReason),
}

impl Outcome {
    /// 是否计入删除/隐藏计数
    pub fn is_purged(&self) -> bool {
        matches!(self, Outcome::Deleted | Outcome::Hidden)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Deleted => write!(f, "已删除"),
            Outcome::Hidden => write!(f, "已隐藏"),
            Outcome::Skipped(SkipReason::TooRecent) => write!(f, "跳过 (太新)"),
            Outcome::Errored(reason) => write!(f, "错误 ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_has_priority_over_hide() {
        assert_eq!(PurgeAction::PRIORITY[0], PurgeAction::Delete);
        assert_eq!(PurgeAction::PRIORITY[1].marker(), "Hidden from timeline");
    }

    #[test]
    fn only_deleted_and_hidden_are_purged() {
        assert!(Outcome::Deleted.is_purged());
        assert!(Outcome::Hidden.is_purged());
        assert!(!Outcome::Skipped(SkipReason::TooRecent).is_purged());
        assert!(!Outcome::Errored(ErrorReason::NoMenuButton).is_purged());
    }

    #[test]
    fn action_colors_come_from_palette() {
        let palette = Palette::default();
        assert_eq!(PurgeAction::Delete.color(&palette), "#e74c3c");
        assert_eq!(PurgeAction::Hide.color(&palette), "#f39c12");
    }
}
