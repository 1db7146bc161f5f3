//! 动态清理应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责浏览器资源和多轮扫描的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写审计文件头、连接或启动浏览器、创建文档访问对象
//! 2. **会话检查**：（可选）登录，然后确认能拿到个人主页用户名，否则整体失败
//! 3. **加载动态**：展开所有年份，反复滚动并点击"更多动态"
//! 4. **逐轮处理**：每轮扫描一次条目快照，委托 `process_batch` 处理
//! 5. **停止条件**：达到目标数量，或某一轮没有任何进展
//! 6. **全局统计**：汇总删除/隐藏/跳过/错误数量

use std::time::Instant;

use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::{Config, RunConfig};
use crate::error::{AppResult, SessionError};
use crate::infrastructure::{ChromiumDocument, Document, JsExecutor, WaitState};
use crate::models::{Counters, HandledSet, SideStats};
use crate::orchestrator::batch_controller::{process_batch, scan_entries, BatchReport};
use crate::services::AuditWriter;
use crate::utils::logging::{log_pass_complete, log_pass_start, log_startup, print_final_stats};

/// 一次运行的最终结果
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub counters: Counters,
    pub side: SideStats,
}

/// 应用主结构
pub struct App {
    config: Config,
    run_config: RunConfig,
    _browser: Browser,
    document: ChromiumDocument,
    audit: AuditWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let audit = AuditWriter::new(config.audit_log_file.clone());
        audit.init(config.dry_run)?;

        log_startup(&config);

        let start_url = if config.email.is_some() {
            login_url(&config.base_url)
        } else {
            config.base_url.clone()
        };

        let (browser, page) = if config.launch_browser {
            browser::launch_browser(
                &start_url,
                config.headless,
                config.chrome_executable.as_deref(),
            )
            .await?
        } else {
            browser::connect_to_browser_and_page(config.browser_debug_port, &start_url).await?
        };

        let document = ChromiumDocument::new(JsExecutor::new(page));
        let run_config = config.run_config(chrono::Local::now().naive_local());

        Ok(Self {
            config,
            run_config,
            _browser: browser,
            document,
            audit,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunSummary> {
        let started = Instant::now();

        if let Some((email, password)) = self.config.login_credentials()? {
            self.login(email, password).await?;
        }

        // 没有登录就不能开始，这是致命错误
        let profile = self.establish_profile().await?;
        info!("✓ 当前用户: {}", profile);
        let url = activity_url(&self.config.base_url, &profile);

        let mut handled = HandledSet::new();
        let mut counters = Counters::new();
        let mut side = SideStats::default();
        let mut pass = 0;

        loop {
            pass += 1;
            self.document.navigate(&url).await?;
            sleep(self.config.page_wait()).await;

            self.load_activity(&counters).await;

            let entries = scan_entries(&self.document, &self.run_config.selectors).await?;
            log_pass_start(pass, entries.len());
            if self.config.days > 0 {
                info!("[*] 正在处理 {} 天以前的条目", self.config.days);
            }

            let report = process_batch(
                &self.document,
                entries,
                pass,
                &mut handled,
                &mut counters,
                &self.run_config,
            )
            .await;

            self.record_report(&report, &mut side);
            log_pass_complete(pass, report.purged, &counters);

            if report.target_reached {
                info!("Done! 已达到目标数量");
                break;
            }
            if report.purged == 0 {
                info!("本轮没有任何进展，结束");
                break;
            }
        }

        print_final_stats(&counters, &side, started.elapsed(), self.audit.path());
        info!(
            "共删除 {} 条，{} 条已从时间线隐藏",
            counters.deleted(),
            counters.hidden()
        );

        Ok(RunSummary { counters, side })
    }

    /// 用邮箱和密码登录
    async fn login(&self, email: &str, password: &str) -> AppResult<()> {
        info!("🔑 正在登录: {}", email);
        let page = self.document.executor().page();
        let failed = |e: chromiumoxide::error::CdpError| SessionError::LoginFailed(e.to_string());

        if !page.url().await.map_err(failed)?.unwrap_or_default().contains("/login") {
            self.document.navigate(&login_url(&self.config.base_url)).await?;
        }

        let email_input = page.find_element("#email").await.map_err(failed)?;
        email_input.click().await.map_err(failed)?;
        email_input.type_str(email).await.map_err(failed)?;

        let password_input = page.find_element("#pass").await.map_err(failed)?;
        password_input.click().await.map_err(failed)?;
        password_input.type_str(password).await.map_err(failed)?;
        password_input.press_key("Enter").await.map_err(failed)?;

        sleep(self.config.page_wait()).await;
        Ok(())
    }

    /// 确认会话可用并取得个人主页用户名
    async fn establish_profile(&self) -> AppResult<String> {
        let selectors = &self.run_config.selectors;
        let timeout = std::time::Duration::from_millis(self.config.timing.element_timeout_ms);

        let link = self
            .document
            .wait_for(&selectors.profile_link(), WaitState::Presence, timeout)
            .await?
            .ok_or(SessionError::ProfileLinkMissing)?;

        let href = self
            .document
            .attribute(&link, "href")
            .await?
            .unwrap_or_default();

        let profile = profile_name_from_href(&href)
            .ok_or(SessionError::ProfileNameUnparsable { href })?;
        Ok(profile)
    }

    /// 展开所有年份并尽可能多地加载动态
    async fn load_activity(&self, counters: &Counters) {
        let selectors = &self.run_config.selectors;
        let timing = &self.config.timing;
        let element_timeout = std::time::Duration::from_millis(timing.element_timeout_ms);

        let years = self
            .document
            .find_all(&selectors.year())
            .await
            .unwrap_or_default();
        debug!("展开 {} 个年份", years.len());
        for year in &years {
            if let Err(e) = self.document.invoke(year).await {
                debug!("展开年份失败: {}", e);
            }
            sleep(self.config.page_wait()).await;
        }

        let mut failures = 0;
        let mut pages = 0;
        loop {
            if self.run_config.target_reached(counters) {
                break;
            }
            if failures >= timing.max_pager_failures {
                debug!("连续 {} 次没有加载到更多动态，停止加载", failures);
                break;
            }

            sleep(self.config.page_wait()).await;
            if let Err(e) = self.document.scroll_to_bottom().await {
                debug!("滚动失败: {}", e);
            }

            let pager = self
                .document
                .wait_for(&selectors.more_pager(), WaitState::Presence, element_timeout)
                .await;
            match pager {
                Ok(Some(pager)) => match self.document.invoke(&pager).await {
                    Ok(()) => {
                        failures = 0;
                        pages += 1;
                        sleep(self.config.page_wait()).await;
                    }
                    Err(e) => {
                        debug!("点击\"更多动态\"失败: {}", e);
                        failures += 1;
                    }
                },
                Ok(None) => {
                    debug!("等待\"更多动态\"按钮超时");
                    failures += 1;
                }
                Err(e) => {
                    debug!("查找\"更多动态\"按钮失败: {}", e);
                    failures += 1;
                }
            }
        }

        info!("📜 已加载 {} 页更多动态", pages);
        if let Err(e) = self.document.scroll_to_top().await {
            debug!("滚动到顶部失败: {}", e);
        }
    }

    /// 汇总统计并写审计日志
    fn record_report(&self, report: &BatchReport, side: &mut SideStats) {
        for record in &report.records {
            side.record(record.outcome);
            if record.outcome.is_purged() {
                continue;
            }
            if let Err(e) =
                self.audit
                    .write(&record.id, record.timestamp_text.as_deref(), record.outcome)
            {
                warn!("写入审计日志失败: {}", e);
            }
        }
    }
}

/// 登录页地址
fn login_url(base_url: &str) -> String {
    format!("{}/login/", base_url.trim_end_matches('/'))
}

/// 活动记录页地址（只看"你的帖子"）
pub fn activity_url(base_url: &str, profile: &str) -> String {
    format!(
        "{}/{}/allactivity?privacy_source=activity_log&log_filter=cluster_11",
        base_url.trim_end_matches('/'),
        profile
    )
}

/// 从个人主页链接中取出用户名，例如 `https://www.facebook.com/john.doe` → `john.doe`
pub fn profile_name_from_href(href: &str) -> Option<String> {
    let without_scheme = href.split_once("://").map(|(_, rest)| rest).unwrap_or(href);
    let (_, path) = without_scheme.split_once('/')?;
    let name = path.trim_matches('/');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_name_is_path_after_host() {
        assert_eq!(
            profile_name_from_href("https://www.facebook.com/john.doe"),
            Some("john.doe".to_string())
        );
        assert_eq!(
            profile_name_from_href("http://www.facebook.com/jane/"),
            Some("jane".to_string())
        );
        assert_eq!(profile_name_from_href("https://www.facebook.com/"), None);
        assert_eq!(profile_name_from_href(""), None);
    }

    #[test]
    fn activity_url_filters_own_posts() {
        assert_eq!(
            activity_url("https://www.facebook.com/", "john.doe"),
            "https://www.facebook.com/john.doe/allactivity?privacy_source=activity_log&log_filter=cluster_11"
        );
        assert_eq!(login_url("https://www.facebook.com"), "https://www.facebook.com/login/");
    }
}
