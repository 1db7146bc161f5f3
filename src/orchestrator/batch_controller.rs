//! 单轮扫描处理器 - 编排层
//!
//! ## 职责
//!
//! 对一次扫描得到的条目快照逐个调用 `EntryProcessor`，并在达到目标数量时立即停止。
//! 本模块不负责翻页或滚动，那是 `App` 的工作。
//!
//! ## 返回值
//!
//! 本轮真正完成删除/隐藏的条目数。调用方用"一轮零进展"作为停止加载更多的信号。

use tracing::{debug, info};

use crate::config::{RunConfig, Selectors};
use crate::error::DocumentResult;
use crate::infrastructure::{Document, ElementHandle};
use crate::models::{Counters, Entry, EntryId, HandledSet, Outcome};
use crate::workflow::{EntryCtx, EntryProcessor};

/// 单个条目的处理记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: EntryId,
    pub timestamp_text: Option<String>,
    pub outcome: Outcome,
}

/// 一轮扫描的结果
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    /// 本轮删除/隐藏的条目数
    pub purged: usize,
    /// 是否已经达到目标数量
    pub target_reached: bool,
    /// 本轮实际处理过的条目（不含被去重忽略的）
    pub records: Vec<EntryRecord>,
}

/// 扫描页面上当前所有条目
///
/// 元素句柄在重新导航后会全部失效，所以身份取自页面本身的内容，见 `entry_identity`
pub async fn scan_entries(
    document: &dyn Document,
    selectors: &Selectors,
) -> DocumentResult<Vec<Entry>> {
    let elements = document.find_all(&selectors.entry()).await?;
    let mut entries = Vec::with_capacity(elements.len());
    for element in elements {
        let id = entry_identity(document, selectors, &element).await;
        entries.push(Entry::new(id, element));
    }
    Ok(entries)
}

/// 取条目的跨页面加载身份
///
/// 依次尝试：时间戳永久链接、根元素 `id` 属性、根元素文本。都没有时退回元素句柄，
/// 这种条目在下一次导航后无法被识别为已处理。查询出错按"没有"处理。
async fn entry_identity(
    document: &dyn Document,
    selectors: &Selectors,
    element: &ElementHandle,
) -> EntryId {
    let link = document
        .find_first(&selectors.timestamp(), Some(element))
        .await
        .ok()
        .flatten();
    if let Some(link) = link {
        if let Some(href) = non_empty(document.attribute(&link, "href").await.ok().flatten()) {
            return EntryId::new(href);
        }
    }

    if let Some(id) = non_empty(document.attribute(element, "id").await.ok().flatten()) {
        return EntryId::new(format!("#{}", id));
    }

    if let Some(text) = non_empty(document.read_text(element).await.ok().flatten()) {
        return EntryId::new(format!("text:{}", text));
    }

    debug!("条目 {} 没有稳定身份，使用元素句柄", element);
    EntryId::from(element)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 处理一轮条目快照
///
/// # 参数
/// - `document`: 文档访问能力
/// - `entries`: 本轮扫描到的条目，按给定顺序处理
/// - `pass`: 第几轮（仅用于日志）
/// - `handled`: 本次运行已处理的身份
/// - `counters`: 删除/隐藏计数
/// - `config`: 本次运行的配置
pub async fn process_batch(
    document: &dyn Document,
    entries: Vec<Entry>,
    pass: usize,
    handled: &mut HandledSet,
    counters: &mut Counters,
    config: &RunConfig,
) -> BatchReport {
    let processor = EntryProcessor::new(document, config);
    let mut report = BatchReport::default();

    for (idx, mut entry) in entries.into_iter().enumerate() {
        if config.target_reached(counters) {
            report.target_reached = true;
            break;
        }

        let ctx = EntryCtx::new(pass, idx + 1, entry.id.clone());
        let Some(outcome) = processor.run(&mut entry, &ctx, handled, counters).await else {
            continue;
        };

        report.records.push(EntryRecord {
            id: entry.id,
            timestamp_text: entry.timestamp_text,
            outcome,
        });

        if outcome.is_purged() {
            report.purged += 1;
            if config.target_reached(counters) {
                info!("🎯 已达到目标数量 {}，停止本轮", counters.total());
                report.target_reached = true;
                break;
            }
        }
    }

    debug!(
        "第 {} 轮: 处理 {} 个条目，删除/隐藏 {} 个",
        pass,
        report.records.len(),
        report.purged
    );
    report
}
