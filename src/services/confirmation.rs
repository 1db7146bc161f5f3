//! 确认对话框处理 - 业务能力层
//!
//! 两个分支形状完全一样：正常模式等待并点击"确认"，模拟模式等待并点击"取消"。

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{ConfirmPolicy, RetryPolicy, RunConfig};
use crate::infrastructure::{Document, ElementHandle, Locator, WaitState};
use crate::models::ErrorReason;
use crate::utils::retry::retry_with_backoff;

/// 确认对话框处理服务
pub struct ConfirmationHandler {
    policy: ConfirmPolicy,
    invoke_retry: RetryPolicy,
    dialog: Locator,
    ignored_dialog_id: String,
    /// 本次要点击的按钮：确认或取消
    target: Locator,
    simulated: bool,
}

impl ConfirmationHandler {
    pub fn new(config: &RunConfig) -> Self {
        let selectors = &config.selectors;
        let target = if config.simulated {
            selectors.cancel()
        } else {
            selectors.confirm()
        };
        Self {
            policy: config.confirm,
            invoke_retry: config.invoke_retry,
            dialog: selectors.dialog(),
            ignored_dialog_id: selectors.ignored_dialog_id.clone(),
            target,
            simulated: config.simulated,
        }
    }

    /// 找到当前的确认对话框，跳过好友请求浮层
    ///
    /// 只用于记录，找不到不影响后续流程
    pub async fn find_dialog(&self, document: &dyn Document) -> Option<ElementHandle> {
        let dialogs = document.find_all(&self.dialog).await.ok()?;
        for dialog in dialogs {
            let id = document.attribute(&dialog, "id").await.ok().flatten();
            if id.as_deref() == Some(self.ignored_dialog_id.as_str()) {
                continue;
            }
            return Some(dialog);
        }
        None
    }

    /// 等待确认（或取消）按钮出现并点击
    pub async fn settle(&self, document: &dyn Document) -> Result<(), ErrorReason> {
        if self.simulated {
            info!("[*] [模拟] 正在取消本次操作...");
        }

        for attempt in 1..=self.policy.attempts {
            sleep(self.policy.poll_interval).await;

            let button = match document
                .wait_for(&self.target, WaitState::Visible, self.policy.timeout)
                .await
            {
                Ok(Some(button)) => button,
                Ok(None) => {
                    debug!("确认层未出现 (尝试 {}/{})", attempt, self.policy.attempts);
                    continue;
                }
                Err(e) => {
                    debug!("等待确认层失败: {}", e);
                    continue;
                }
            };

            return retry_with_backoff(self.invoke_retry, "点击确认层按钮", || {
                document.invoke(&button)
            })
            .await
            .map_err(|_| ErrorReason::ConfirmationTimeout);
        }

        warn!("{}层始终没有出现", if self.simulated { "取消" } else { "确认" });
        Err(ErrorReason::ConfirmationTimeout)
    }
}
