//! 条目处理流程 - 流程层
//!
//! 核心职责：定义"一个条目"的完整处理流程
//!
//! 流程顺序：
//! 1. 去重 → 记录身份 → 年龄判断
//! 2. 打开菜单 → 解析删除/隐藏选项（找不到时重新打开菜单，有次数上限）
//! 3. 点击选项 → 识别确认对话框
//! 4. 确认（模拟模式下取消）→ 等待界面刷新
//! 5. 记录结果、更新计数

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::infrastructure::{Document, ElementHandle, Locator};
use crate::models::{Counters, Entry, ErrorReason, HandledSet, Outcome};
use crate::services::{
    Classification, ConfirmationHandler, EntryClassifier, PurgeActionResolver, ResolvedAction,
};
use crate::utils::retry::retry_with_backoff;
use crate::workflow::entry_ctx::EntryCtx;

/// 条目处理器
///
/// - 一次只驱动一个条目，走完才开始下一个
/// - 不持有页面资源，只依赖 `Document` 能力
/// - 条目级别的结构性错误作为 `Outcome::Errored` 返回，不会中断批处理
pub struct EntryProcessor<'a> {
    document: &'a dyn Document,
    config: &'a RunConfig,
    classifier: EntryClassifier,
    resolver: PurgeActionResolver,
    confirmation: ConfirmationHandler,
    menu_button: Locator,
}

impl<'a> EntryProcessor<'a> {
    pub fn new(document: &'a dyn Document, config: &'a RunConfig) -> Self {
        Self {
            document,
            config,
            classifier: EntryClassifier::new(&config.selectors),
            resolver: PurgeActionResolver::new(&config.selectors),
            confirmation: ConfirmationHandler::new(config),
            menu_button: config.selectors.menu_button(),
        }
    }

    /// 处理一个条目
    ///
    /// # 返回
    /// 已经处理过的条目返回 `None`（不做任何操作、不动计数），否则返回最终结果
    pub async fn run(
        &self,
        entry: &mut Entry,
        ctx: &EntryCtx,
        handled: &mut HandledSet,
        counters: &mut Counters,
    ) -> Option<Outcome> {
        if !handled.insert(&entry.id) {
            debug!("{} 已处理过，忽略", ctx);
            return None;
        }

        let outcome = self.drive(entry, ctx).await;
        counters.record(outcome);
        self.log_outcome(ctx, outcome, counters);
        Some(outcome)
    }

    async fn drive(&self, entry: &mut Entry, ctx: &EntryCtx) -> Outcome {
        let palette = &self.config.palette;

        // ========== 年龄判断 ==========
        match self
            .classifier
            .classify(self.document, entry, &self.config.cutoff)
            .await
        {
            Classification::Proceed => {}
            Classification::Skip(reason) => {
                info!("{} 太新，跳过", ctx);
                self.annotate(&entry.element, &palette.skip).await;
                return Outcome::Skipped(reason);
            }
            Classification::Error(reason) => {
                warn!("{} 没有时间戳，为安全起见跳过", ctx);
                return self.fail(entry, ctx, reason).await;
            }
        }

        // ========== 打开菜单并解析动作 ==========
        let resolved = match self.open_menu_and_resolve(entry, ctx).await {
            Ok(resolved) => resolved,
            Err(reason) => return self.fail(entry, ctx, reason).await,
        };

        // ========== 点击动作 ==========
        info!("{} [*] 正在{}条目...", ctx, resolved.action);
        let invoked = retry_with_backoff(self.config.invoke_retry, "点击菜单选项", || {
            self.document.invoke(&resolved.element)
        })
        .await;
        if invoked.is_err() {
            return self.fail(entry, ctx, ErrorReason::NoPurgeButton).await;
        }

        match self.confirmation.find_dialog(self.document).await {
            Some(dialog) => debug!("{} 确认对话框: {}", ctx, dialog),
            None => debug!("{} 未识别到确认对话框，继续", ctx),
        }

        // ========== 确认 / 取消 ==========
        debug!("{} [*] 正在查找确认按钮...", ctx);
        if let Err(reason) = self.confirmation.settle(self.document).await {
            return self.fail(entry, ctx, reason).await;
        }
        sleep(self.config.settle_delay).await;

        if self.config.simulated {
            self.annotate(&entry.element, resolved.action.color(palette)).await;
        }

        resolved.action.outcome()
    }

    /// 打开菜单并解析出动作
    ///
    /// 菜单里找不到动作时重新打开菜单再试，次数由 `resolve_retry` 限制
    async fn open_menu_and_resolve(
        &self,
        entry: &Entry,
        ctx: &EntryCtx,
    ) -> Result<ResolvedAction, ErrorReason> {
        let policy = self.config.resolve_retry;

        for attempt in 1..=policy.attempts {
            let menu_button = match self
                .document
                .find_first(&self.menu_button, Some(&entry.element))
                .await
            {
                Ok(Some(button)) => button,
                Ok(None) => return Err(ErrorReason::NoMenuButton),
                Err(e) => {
                    debug!("{} 查找菜单按钮失败: {}", ctx, e);
                    return Err(ErrorReason::NoMenuButton);
                }
            };

            let opened = retry_with_backoff(self.config.invoke_retry, "点击菜单按钮", || {
                self.document.invoke(&menu_button)
            })
            .await;
            if opened.is_err() {
                return Err(ErrorReason::NoMenuButton);
            }
            self.annotate(&menu_button, &self.config.palette.in_progress).await;

            sleep(self.config.step_delay).await;

            let resolved = match self.resolver.find_open_menu(self.document).await {
                Some(menu) => self.resolver.resolve(self.document, &menu).await,
                None => {
                    debug!("{} 没有打开的菜单层", ctx);
                    None
                }
            };
            if let Some(resolved) = resolved {
                return Ok(resolved);
            }

            warn!("{} 未找到删除/隐藏选项 (尝试 {}/{})", ctx, attempt, policy.attempts);
            self.annotate(&entry.element, &self.config.palette.error).await;
            if attempt < policy.attempts {
                sleep(policy.backoff).await;
            }
        }

        Err(ErrorReason::NoPurgeButton)
    }

    async fn fail(&self, entry: &Entry, ctx: &EntryCtx, reason: ErrorReason) -> Outcome {
        warn!("{} ❌ {}", ctx, reason);
        self.annotate(&entry.element, &self.config.palette.error).await;
        Outcome::Errored(reason)
    }

    /// 设置标记颜色，失败只记录不影响流程
    async fn annotate(&self, element: &ElementHandle, color: &str) {
        if let Err(e) = self.document.set_annotation(element, color).await {
            debug!("设置标记颜色失败 ({}): {}", element, e);
        }
    }

    fn log_outcome(&self, ctx: &EntryCtx, outcome: Outcome, counters: &Counters) {
        let prefix = if self.config.simulated { "[模拟] " } else { "" };
        match outcome {
            Outcome::Deleted => info!(
                "{} [+] {}条目已删除 (累计 {})",
                ctx,
                prefix,
                counters.deleted()
            ),
            Outcome::Hidden => info!(
                "{} [+] {}条目已隐藏 (累计 {})",
                ctx,
                prefix,
                counters.hidden()
            ),
            Outcome::Skipped(_) | Outcome::Errored(_) => debug!("{} 结果: {}", ctx, outcome),
        }
    }
}
