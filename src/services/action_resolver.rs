//! 清除动作解析 - 业务能力层
//!
//! 在已经打开的菜单中找出可用的清除动作。查找是尽力而为的：
//! 某个选项找不到（或查找本身出错）只意味着"试下一个"，不会上报为错误。

use tracing::debug;

use crate::config::Selectors;
use crate::infrastructure::{Document, ElementHandle, Locator};
use crate::models::PurgeAction;

/// 解析出的动作和对应的菜单项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub action: PurgeAction,
    pub element: ElementHandle,
}

/// 清除动作解析服务
pub struct PurgeActionResolver {
    menu_layer: Locator,
    hidden_class: String,
}

impl PurgeActionResolver {
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            menu_layer: selectors.menu_layer(),
            hidden_class: selectors.hidden_layer_class.clone(),
        }
    }

    /// 找到当前打开的（没有隐藏 class 的）第一个菜单层
    pub async fn find_open_menu(&self, document: &dyn Document) -> Option<ElementHandle> {
        let layers = match document.find_all(&self.menu_layer).await {
            Ok(layers) => layers,
            Err(e) => {
                debug!("查找菜单层失败: {}", e);
                return None;
            }
        };

        for layer in layers {
            let class = document
                .attribute(&layer, "class")
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            if class.split_whitespace().any(|c| c == self.hidden_class) {
                continue;
            }
            return Some(layer);
        }
        None
    }

    /// 按固定优先级（先删除，后隐藏）在菜单中查找动作
    pub async fn resolve(
        &self,
        document: &dyn Document,
        menu: &ElementHandle,
    ) -> Option<ResolvedAction> {
        for action in PurgeAction::PRIORITY {
            let locator = Locator::span_containing(action.marker());
            match document.find_first(&locator, Some(menu)).await {
                Ok(Some(element)) => {
                    debug!("菜单 {} 中找到 \"{}\"", menu, action.marker());
                    return Some(ResolvedAction { action, element });
                }
                Ok(None) => {}
                Err(e) => debug!("查找 \"{}\" 失败: {}", action.marker(), e),
            }
        }
        None
    }
}
