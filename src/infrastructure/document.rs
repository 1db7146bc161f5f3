//! 文档访问接口 - 基础设施层
//!
//! 核心状态机只依赖这里定义的抽象能力：按定位器查找元素、等待元素出现、
//! 通过脚本触发点击、设置视觉标记。真实浏览器和测试用的假文档都实现这个 trait。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DocumentResult;

/// 元素定位器
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS 选择器
    Css(String),
    /// XPath 表达式（以 `.` 开头时相对于 scope 元素）
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// 查找包含指定文本的 span（菜单项文本匹配）
    pub fn span_containing(text: &str) -> Self {
        Locator::XPath(format!(r#".//span[contains(text(), "{}")]"#, text))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// 等待条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// 元素存在于文档中即可
    Presence,
    /// 元素必须可见
    Visible,
}

/// 元素句柄
///
/// 在一次运行中保持稳定：同一个 DOM 元素每次被查到时得到相同的句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 文档访问能力
///
/// 实现方不需要可重入：调用方保证同一时刻只有一个交互在进行
#[async_trait]
pub trait Document: Send + Sync {
    /// 查找所有匹配的元素（每次调用都重新查询，不缓存）
    async fn find_all(&self, locator: &Locator) -> DocumentResult<Vec<ElementHandle>>;

    /// 查找第一个匹配的元素，`scope` 为空时在整个文档中查找
    async fn find_first(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
    ) -> DocumentResult<Option<ElementHandle>>;

    /// 轮询等待元素达到指定状态，超时返回 `None`
    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> DocumentResult<Option<ElementHandle>>;

    /// 通过脚本触发元素的点击
    async fn invoke(&self, element: &ElementHandle) -> DocumentResult<()>;

    /// 设置背景色标记，仅用于人工审查
    async fn set_annotation(&self, element: &ElementHandle, color: &str) -> DocumentResult<()>;

    /// 读取元素属性
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> DocumentResult<Option<String>>;

    /// 读取元素的文本内容（去除首尾空白，空文本返回 `None`）
    async fn read_text(&self, element: &ElementHandle) -> DocumentResult<Option<String>>;

    /// 滚动到页面底部
    async fn scroll_to_bottom(&self) -> DocumentResult<()>;

    /// 滚动到页面顶部
    async fn scroll_to_top(&self) -> DocumentResult<()>;
}
