//! 测试用的假文档
//!
//! 按脚本模拟活动记录页：条目、菜单按钮、弹出菜单层、确认对话框。
//! 所有点击都会被记录下来，便于断言"没有对某个条目做任何操作"。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use activity_eraser::config::{Config, RunConfig, Selectors, Timing};
use activity_eraser::error::{DocumentError, DocumentResult};
use activity_eraser::{Document, ElementHandle, Locator, WaitState};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

pub const DELETE: &str = "Delete";
pub const HIDE: &str = "Hidden from timeline";

/// 固定的"现在"
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("合法时间")
}

/// 所有等待都为 0 的运行配置
pub fn run_config(days: u32, count: Option<usize>, simulated: bool) -> RunConfig {
    let config = Config {
        days,
        count,
        dry_run: simulated,
        timing: Timing {
            step_delay_ms: 0,
            settle_delay_ms: 0,
            invoke_backoff_ms: 0,
            resolve_backoff_ms: 0,
            confirm_timeout_ms: 0,
            confirm_poll_ms: 0,
            element_timeout_ms: 0,
            ..Timing::default()
        },
        ..Config::default()
    };
    config.run_config(now())
}

/// 一个脚本化的条目
#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub id: String,
    pub timestamp: Option<String>,
    /// 时间戳链接的 href，页面重新加载后不变
    pub permalink: Option<String>,
    pub has_menu_button: bool,
    /// 第 n 次打开菜单时出现的选项，次数超出后重复最后一项
    pub menus: Vec<Vec<&'static str>>,
    pub menu_click_failures: usize,
    pub action_click_failures: usize,
    pub confirm_shows: bool,
}

impl FakeEntry {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamp: None,
            permalink: None,
            has_menu_button: true,
            menus: vec![vec![DELETE]],
            menu_click_failures: 0,
            action_click_failures: 0,
            confirm_shows: true,
        }
    }

    pub fn timestamp(mut self, text: &str) -> Self {
        self.timestamp = Some(text.to_string());
        self
    }

    pub fn permalink(mut self, href: &str) -> Self {
        self.permalink = Some(href.to_string());
        self
    }

    pub fn without_menu_button(mut self) -> Self {
        self.has_menu_button = false;
        self
    }

    pub fn menu(mut self, markers: Vec<&'static str>) -> Self {
        self.menus = vec![markers];
        self
    }

    pub fn menus(mut self, menus: Vec<Vec<&'static str>>) -> Self {
        self.menus = menus;
        self
    }

    pub fn failing_menu_clicks(mut self, n: usize) -> Self {
        self.menu_click_failures = n;
        self
    }

    pub fn failing_action_clicks(mut self, n: usize) -> Self {
        self.action_click_failures = n;
        self
    }

    pub fn without_confirmation(mut self) -> Self {
        self.confirm_shows = false;
        self
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub entries: Vec<FakeEntry>,
    /// 为 true 时每次扫描都发放新的元素句柄，模拟页面重新加载
    reissue_handles: bool,
    /// 条目扫描次数
    pub scans: usize,
    open_menu: Option<usize>,
    pending: Option<(usize, &'static str)>,
    /// 每个条目菜单被打开的次数
    pub menu_opens: HashMap<String, usize>,
    /// 真正提交的操作 (条目, 选项)
    pub committed: Vec<(String, String)>,
    /// 被取消的操作 (条目, 选项)
    pub cancelled: Vec<(String, String)>,
    /// 所有成功的点击
    pub invocations: Vec<String>,
    /// 所有标记 (元素, 颜色)
    pub annotations: Vec<(String, String)>,
}

impl State {
    /// 某个条目（包括其子元素）上发生过的点击次数
    pub fn invocations_for(&self, id: &str) -> usize {
        self.invocations
            .iter()
            .filter(|h| h.split(':').nth(1).map(entry_id_of) == Some(id))
            .count()
    }

    pub fn annotation_of(&self, handle: &str) -> Option<&str> {
        self.annotations
            .iter()
            .rev()
            .find(|(h, _)| h == handle)
            .map(|(_, c)| c.as_str())
    }

    fn index_of(&self, handle: &str) -> Option<usize> {
        let id = entry_id_of(handle);
        self.entries.iter().position(|e| e.id == id)
    }

    fn entry_handle(&self, entry: &FakeEntry) -> String {
        if self.reissue_handles {
            format!("{}#{}", entry.id, self.scans)
        } else {
            entry.id.clone()
        }
    }

    fn current_menu(&self, idx: usize) -> &[&'static str] {
        let entry = &self.entries[idx];
        let opens = self.menu_opens.get(&entry.id).copied().unwrap_or(1);
        let slot = opens.saturating_sub(1).min(entry.menus.len().saturating_sub(1));
        entry.menus.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// 条目句柄 `e1#3` 对应的条目 id `e1`
fn entry_id_of(handle: &str) -> &str {
    handle.split('#').next().unwrap_or(handle)
}

/// 假文档
pub struct FakeDocument {
    selectors: Selectors,
    state: Mutex<State>,
}

impl FakeDocument {
    pub fn new(entries: Vec<FakeEntry>) -> Self {
        Self {
            selectors: Selectors::default(),
            state: Mutex::new(State {
                entries,
                ..State::default()
            }),
        }
    }

    /// 每次扫描都换一批元素句柄，就像每轮都重新导航到活动页
    pub fn reissuing_handles(self) -> Self {
        self.state().reissue_handles = true;
        self
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("状态锁")
    }

    fn matching_marker(locator: &Locator) -> Option<&'static str> {
        [DELETE, HIDE]
            .into_iter()
            .find(|m| *locator == Locator::span_containing(m))
    }
}

#[async_trait]
impl Document for FakeDocument {
    async fn find_all(&self, locator: &Locator) -> DocumentResult<Vec<ElementHandle>> {
        let mut state = self.state();
        let handles: Vec<String> = if *locator == self.selectors.entry() {
            state.scans += 1;
            state.entries.iter().map(|e| state.entry_handle(e)).collect()
        } else if *locator == self.selectors.menu_layer() {
            let mut layers = vec!["layer:hidden".to_string()];
            if state.open_menu.is_some() {
                layers.push("layer:open".to_string());
            }
            layers
        } else if *locator == self.selectors.dialog() {
            let mut dialogs = vec!["dialog:flyout".to_string()];
            if state.pending.is_some() {
                dialogs.push("dialog:confirm".to_string());
            }
            dialogs
        } else {
            Vec::new()
        };
        Ok(handles.into_iter().map(ElementHandle::new).collect())
    }

    async fn find_first(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
    ) -> DocumentResult<Option<ElementHandle>> {
        let state = self.state();
        let Some(scope) = scope else {
            return Ok(None);
        };

        if *locator == self.selectors.timestamp() {
            let found = state
                .index_of(scope.as_str())
                .and_then(|i| state.entries[i].timestamp.as_ref())
                .map(|_| format!("ts:{}", scope));
            return Ok(found.map(ElementHandle::new));
        }

        if *locator == self.selectors.menu_button() {
            let found = state
                .index_of(scope.as_str())
                .filter(|i| state.entries[*i].has_menu_button)
                .map(|_| format!("menu-button:{}", scope));
            return Ok(found.map(ElementHandle::new));
        }

        if let Some(marker) = Self::matching_marker(locator) {
            if scope.as_str() != "layer:open" {
                return Ok(None);
            }
            let Some(idx) = state.open_menu else {
                return Ok(None);
            };
            if state.current_menu(idx).contains(&marker) {
                let id = &state.entries[idx].id;
                return Ok(Some(ElementHandle::new(format!("action:{}:{}", id, marker))));
            }
        }

        Ok(None)
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        _state: WaitState,
        _timeout: Duration,
    ) -> DocumentResult<Option<ElementHandle>> {
        let state = self.state();
        let Some((idx, _)) = state.pending else {
            return Ok(None);
        };
        if !state.entries[idx].confirm_shows {
            return Ok(None);
        }
        if *locator == self.selectors.confirm() {
            Ok(Some(ElementHandle::new("button:confirm")))
        } else if *locator == self.selectors.cancel() {
            Ok(Some(ElementHandle::new("button:cancel")))
        } else {
            Ok(None)
        }
    }

    async fn invoke(&self, element: &ElementHandle) -> DocumentResult<()> {
        let mut state = self.state();
        let handle = element.as_str();

        if let Some(id) = handle.strip_prefix("menu-button:") {
            let idx = state
                .index_of(id)
                .ok_or_else(|| DocumentError::StaleElement(handle.to_string()))?;
            if state.entries[idx].menu_click_failures > 0 {
                state.entries[idx].menu_click_failures -= 1;
                return Err(DocumentError::Script("element not interactable".to_string()));
            }
            let key = state.entries[idx].id.clone();
            state.open_menu = Some(idx);
            *state.menu_opens.entry(key).or_insert(0) += 1;
        } else if let Some(rest) = handle.strip_prefix("action:") {
            let (id, marker) = rest
                .split_once(':')
                .ok_or_else(|| DocumentError::StaleElement(handle.to_string()))?;
            let idx = state
                .index_of(id)
                .ok_or_else(|| DocumentError::StaleElement(handle.to_string()))?;
            if state.entries[idx].action_click_failures > 0 {
                state.entries[idx].action_click_failures -= 1;
                return Err(DocumentError::Script("element not interactable".to_string()));
            }
            let marker = if marker == DELETE { DELETE } else { HIDE };
            state.open_menu = None;
            state.pending = Some((idx, marker));
        } else if handle == "button:confirm" || handle == "button:cancel" {
            let (idx, marker) = state
                .pending
                .take()
                .ok_or_else(|| DocumentError::StaleElement(handle.to_string()))?;
            let record = (state.entries[idx].id.clone(), marker.to_string());
            if handle == "button:confirm" {
                state.committed.push(record);
            } else {
                state.cancelled.push(record);
            }
        }

        state.invocations.push(handle.to_string());
        Ok(())
    }

    async fn set_annotation(&self, element: &ElementHandle, color: &str) -> DocumentResult<()> {
        self.state()
            .annotations
            .push((element.to_string(), color.to_string()));
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DocumentResult<Option<String>> {
        let value = match (element.as_str(), name) {
            ("layer:hidden", "class") => Some("uiContextualLayerPositioner uiLayer hidden_elem"),
            ("layer:open", "class") => Some("uiContextualLayerPositioner uiLayer"),
            ("dialog:flyout", "id") => Some("fbRequestsFlyout"),
            (handle, "href") => {
                let state = self.state();
                let permalink = handle
                    .strip_prefix("ts:")
                    .and_then(|h| state.index_of(h))
                    .and_then(|i| state.entries[i].permalink.clone());
                return Ok(permalink);
            }
            _ => None,
        };
        Ok(value.map(str::to_string))
    }

    async fn read_text(&self, element: &ElementHandle) -> DocumentResult<Option<String>> {
        let state = self.state();
        let text = element
            .as_str()
            .strip_prefix("ts:")
            .and_then(|id| state.index_of(id))
            .and_then(|i| state.entries[i].timestamp.clone());
        Ok(text)
    }

    async fn scroll_to_bottom(&self) -> DocumentResult<()> {
        Ok(())
    }

    async fn scroll_to_top(&self) -> DocumentResult<()> {
        Ok(())
    }
}
