use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, BrowserError};

/// 连接到已打开的浏览器并获取页面
///
/// 优先复用已经打开了同一站点的标签页（保留登录状态），否则新建页面并导航到 `target_url`
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: &str,
) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|source| {
        error!("连接浏览器失败: {}", source);
        BrowserError::ConnectionFailed { port, source }
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let site = site_host(target_url);
    let pages = browser.pages().await.map_err(BrowserError::PageCreationFailed)?;
    debug!("获取到 {} 个页面，查找站点 {}", pages.len(), site);
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            if !site.is_empty() && url.contains(site) {
                info!("✓ 复用已打开的页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("创建新页面并导航到: {}", target_url);
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(BrowserError::PageCreationFailed)?;
    page.goto(target_url)
        .await
        .map_err(|source| BrowserError::NavigationFailed {
            url: target_url.to_string(),
            source,
        })?;
    info!("已导航到: {}", target_url);

    Ok((browser, page))
}

/// 取出 URL 中的主机部分
fn site_host(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    without_scheme.split('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_extracted() {
        assert_eq!(site_host("https://www.facebook.com/login/"), "www.facebook.com");
        assert_eq!(site_host("www.facebook.com"), "www.facebook.com");
    }
}
