use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, BrowserError};

/// 启动浏览器并导航到指定 URL
///
/// 默认有界面，方便人工观察标记颜色；`headless` 为真时使用新版无头模式
pub async fn launch_browser(
    url: &str,
    headless: bool,
    executable: Option<&str>,
) -> AppResult<(Browser, Page)> {
    info!("🚀 启动浏览器 (无头: {})...", headless);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        builder = builder.chrome_executable(Path::new(path));
    }
    let config = builder
        .args(vec!["--disable-gpu", "--disable-dev-shm-usage"])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed(e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page(url)
        .await
        .map_err(BrowserError::PageCreationFailed)?;

    info!("✅ 浏览器已导航到: {}", url);
    Ok((browser, page))
}
