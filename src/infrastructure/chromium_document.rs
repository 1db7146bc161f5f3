//! 基于 chromiumoxide 的文档实现
//!
//! 所有操作都通过 `JsExecutor` 在页面中执行脚本完成。元素第一次被查到时会打上
//! `data-eraser-id` 属性，之后用这个属性作为句柄，因此在同一次页面加载内，同一个元素在多次扫描中句柄不变。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{DocumentError, DocumentResult};
use crate::infrastructure::document::{Document, ElementHandle, Locator, WaitState};
use crate::infrastructure::JsExecutor;

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 注入到每段脚本前面的辅助函数
const PRELUDE: &str = r#"
const __prefix = (window.__eraserPrefix = window.__eraserPrefix || Math.random().toString(36).slice(2, 8));
const __tag = (el) => {
    if (!el.dataset.eraserId) {
        window.__eraserSeq = (window.__eraserSeq || 0) + 1;
        el.dataset.eraserId = __prefix + '-' + window.__eraserSeq;
    }
    return el.dataset.eraserId;
};
const __find = (id) => document.querySelector('[data-eraser-id="' + id + '"]');
const __queryAll = (kind, value, scope) => {
    const root = scope || document;
    if (kind === 'css') {
        return Array.from(root.querySelectorAll(value));
    }
    const snap = document.evaluate(value, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const out = [];
    for (let i = 0; i < snap.snapshotLength; i++) {
        const node = snap.snapshotItem(i);
        if (node.nodeType === Node.ELEMENT_NODE) out.push(node);
    }
    return out;
};
const __visible = (el) =>
    !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) &&
    window.getComputedStyle(el).visibility !== 'hidden';
"#;

/// 真实浏览器中的文档
pub struct ChromiumDocument {
    executor: JsExecutor,
}

impl ChromiumDocument {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 在当前页面中导航到指定 URL 并等待加载完成
    pub async fn navigate(&self, url: &str) -> DocumentResult<()> {
        debug!("导航到: {}", url);
        self.executor.page().goto(url).await?;
        Ok(())
    }

    /// 执行带辅助函数的脚本
    async fn run<T: serde::de::DeserializeOwned>(&self, body: &str) -> DocumentResult<T> {
        let js_code = format!("(() => {{ {} {} }})()", PRELUDE, body);
        self.executor.eval_as(js_code).await
    }

    async fn query(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
        visible_only: bool,
        first_only: bool,
    ) -> DocumentResult<Vec<ElementHandle>> {
        let (kind, value) = locator_parts(locator);
        let scope_expr = match scope {
            Some(handle) => format!("__find({})", js_string(handle.as_str())),
            None => "null".to_string(),
        };
        let body = format!(
            r#"
            const scope = {scope};
            if ({has_scope} && !scope) return null;
            let found = __queryAll({kind}, {value}, scope);
            if ({visible_only}) found = found.filter(__visible);
            if ({first_only}) found = found.slice(0, 1);
            return found.map(__tag);
            "#,
            scope = scope_expr,
            has_scope = scope.is_some(),
            kind = js_string(kind),
            value = js_string(value),
            visible_only = visible_only,
            first_only = first_only,
        );

        let ids: Option<Vec<String>> = self.run(&body).await?;
        match ids {
            Some(ids) => Ok(ids.into_iter().map(ElementHandle::new).collect()),
            None => Err(DocumentError::StaleElement(
                scope.map(|s| s.to_string()).unwrap_or_default(),
            )),
        }
    }
}

#[async_trait]
impl Document for ChromiumDocument {
    async fn find_all(&self, locator: &Locator) -> DocumentResult<Vec<ElementHandle>> {
        self.query(locator, None, false, false).await
    }

    async fn find_first(
        &self,
        locator: &Locator,
        scope: Option<&ElementHandle>,
    ) -> DocumentResult<Option<ElementHandle>> {
        Ok(self.query(locator, scope, false, true).await?.into_iter().next())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Duration,
    ) -> DocumentResult<Option<ElementHandle>> {
        let deadline = Instant::now() + timeout;
        let visible_only = state == WaitState::Visible;

        loop {
            let found = self.query(locator, None, visible_only, true).await?;
            if let Some(handle) = found.into_iter().next() {
                return Ok(Some(handle));
            }
            if Instant::now() >= deadline {
                debug!("等待 {} 超时 ({:?})", locator, timeout);
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn invoke(&self, element: &ElementHandle) -> DocumentResult<()> {
        let body = format!(
            r#"
            const el = __find({id});
            if (!el) return false;
            el.click();
            return true;
            "#,
            id = js_string(element.as_str())
        );
        let clicked: bool = self.run(&body).await?;
        if clicked {
            Ok(())
        } else {
            Err(DocumentError::StaleElement(element.to_string()))
        }
    }

    async fn set_annotation(&self, element: &ElementHandle, color: &str) -> DocumentResult<()> {
        let style = format!("background-color: {}", color);
        let body = format!(
            r#"
            const el = __find({id});
            if (!el) return false;
            el.setAttribute('style', {style});
            return true;
            "#,
            id = js_string(element.as_str()),
            style = js_string(&style)
        );
        let _: bool = self.run(&body).await?;
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DocumentResult<Option<String>> {
        let body = format!(
            r#"
            const el = __find({id});
            if (!el) return null;
            return el.getAttribute({name});
            "#,
            id = js_string(element.as_str()),
            name = js_string(name)
        );
        self.run(&body).await
    }

    async fn read_text(&self, element: &ElementHandle) -> DocumentResult<Option<String>> {
        let body = format!(
            r#"
            const el = __find({id});
            if (!el) return null;
            return el.textContent;
            "#,
            id = js_string(element.as_str())
        );
        let text: Option<String> = self.run(&body).await?;
        Ok(text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    async fn scroll_to_bottom(&self) -> DocumentResult<()> {
        self.executor
            .eval("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    async fn scroll_to_top(&self) -> DocumentResult<()> {
        self.executor.eval("window.scrollTo(0, 0);").await?;
        Ok(())
    }
}

fn locator_parts(locator: &Locator) -> (&'static str, &str) {
    match locator {
        Locator::Css(s) => ("css", s.as_str()),
        Locator::XPath(s) => ("xpath", s.as_str()),
    }
}

/// 将字符串编码为 JS 字面量
fn js_string(value: &str) -> String {
    JsonValue::String(value.to_string()).to_string()
}
