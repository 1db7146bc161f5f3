//! 程序配置
//!
//! 配置分三层加载：TOML 文件 → `ERASER_*` 环境变量 → 命令行参数，后加载的覆盖先加载的。
//! 真正驱动状态机的是从 `Config` 派生出来的不可变 `RunConfig`。

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::infrastructure::Locator;
use crate::models::{Counters, RetentionCutoff};

/// 页面加载等待的上限（秒）
const MAX_PAGE_WAIT_SECS: f64 = 3600.0;

/// 保留窗口的上限（天）
pub const MAX_RETENTION_DAYS: u32 = 1_000_000;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 是否自行启动浏览器（否则连接已打开的浏览器）
    pub launch_browser: bool,
    /// 自行启动时是否使用无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 站点根地址
    pub base_url: String,
    /// 登录邮箱（为空时假定浏览器已登录）
    pub email: Option<String>,
    /// 登录密码，只从环境变量读取
    #[serde(skip)]
    pub password: Option<String>,
    /// 页面加载后的等待时间（秒）
    pub page_wait_secs: f64,
    /// 只处理多少天以前的条目，0 表示不过滤
    pub days: u32,
    /// 最多删除/隐藏多少条，为空表示不限
    pub count: Option<usize>,
    /// 模拟模式：走完整个流程但最后点取消
    pub dry_run: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 审计日志文件
    pub audit_log_file: String,
    pub timing: Timing,
    pub selectors: Selectors,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            launch_browser: false,
            headless: false,
            chrome_executable: None,
            base_url: "https://www.facebook.com".to_string(),
            email: None,
            password: None,
            page_wait_secs: 3.0,
            days: 0,
            count: None,
            dry_run: false,
            verbose_logging: false,
            audit_log_file: "eraser_audit.txt".to_string(),
            timing: Timing::default(),
            selectors: Selectors::default(),
            palette: Palette::default(),
        }
    }
}

/// 各步骤的等待与重试参数（毫秒）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// 打开菜单后、查找选项前的等待
    pub step_delay_ms: u64,
    /// 点击确认/取消后等待界面刷新
    pub settle_delay_ms: u64,
    pub invoke_attempts: usize,
    pub invoke_backoff_ms: u64,
    pub resolve_attempts: usize,
    pub resolve_backoff_ms: u64,
    pub confirm_attempts: usize,
    pub confirm_timeout_ms: u64,
    pub confirm_poll_ms: u64,
    /// 等待个人主页链接、"更多动态"按钮等页面元素
    pub element_timeout_ms: u64,
    /// 连续多少次加载更多失败后停止
    pub max_pager_failures: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            step_delay_ms: 1000,
            settle_delay_ms: 2000,
            invoke_attempts: 10,
            invoke_backoff_ms: 1000,
            resolve_attempts: 5,
            resolve_backoff_ms: 2000,
            confirm_attempts: 3,
            confirm_timeout_ms: 2000,
            confirm_poll_ms: 2000,
            element_timeout_ms: 2000,
            max_pager_failures: 3,
        }
    }
}

/// 页面结构选择器
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// 动态条目（CSS）
    pub entry: String,
    /// 条目内的时间戳（CSS，相对条目）
    pub timestamp: String,
    /// 条目内的菜单按钮（XPath，相对条目）
    pub menu_button: String,
    /// 弹出菜单层（CSS）
    pub menu_layer: String,
    /// 隐藏菜单层带的 class
    pub hidden_layer_class: String,
    /// 对话框（XPath）
    pub dialog: String,
    /// 不是确认框的对话框 id（好友请求浮层）
    pub ignored_dialog_id: String,
    /// 确认按钮（XPath）
    pub confirm: String,
    /// 取消按钮（XPath）
    pub cancel: String,
    /// 个人主页链接（XPath）
    pub profile_link: String,
    /// 年份展开链接（CSS）
    pub year: String,
    /// "更多动态"按钮（XPath）
    pub more_pager: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            entry: ".pam.bottomborder".to_string(),
            timestamp: "tbody .clearfix span a".to_string(),
            menu_button: "./table/tbody/tr/td[3]/div/div[2]/a".to_string(),
            menu_layer: ".uiContextualLayerPositioner.uiLayer".to_string(),
            hidden_layer_class: "hidden_elem".to_string(),
            dialog: r#"//div[@role="dialog"]"#.to_string(),
            ignored_dialog_id: "fbRequestsFlyout".to_string(),
            confirm: r#"//button[contains(@class, "layerConfirm")]"#.to_string(),
            cancel: r#"//a[contains(@class, "layerCancel")]"#.to_string(),
            profile_link: r#"//a[@title="Profile"]"#.to_string(),
            year: "[data-year] > a".to_string(),
            more_pager: r#"//a[@class="pam uiBoxLightblue uiMorePagerPrimary"]"#.to_string(),
        }
    }
}

impl Selectors {
    pub fn entry(&self) -> Locator {
        Locator::css(&self.entry)
    }

    pub fn timestamp(&self) -> Locator {
        Locator::css(&self.timestamp)
    }

    pub fn menu_button(&self) -> Locator {
        Locator::xpath(&self.menu_button)
    }

    pub fn menu_layer(&self) -> Locator {
        Locator::css(&self.menu_layer)
    }

    pub fn dialog(&self) -> Locator {
        Locator::xpath(&self.dialog)
    }

    pub fn confirm(&self) -> Locator {
        Locator::xpath(&self.confirm)
    }

    pub fn cancel(&self) -> Locator {
        Locator::xpath(&self.cancel)
    }

    pub fn profile_link(&self) -> Locator {
        Locator::xpath(&self.profile_link)
    }

    pub fn year(&self) -> Locator {
        Locator::css(&self.year)
    }

    pub fn more_pager(&self) -> Locator {
        Locator::xpath(&self.more_pager)
    }
}

/// 标记颜色
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub delete: String,
    pub hide: String,
    pub error: String,
    pub skip: String,
    pub in_progress: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            delete: "#e74c3c".to_string(),
            hide: "#f39c12".to_string(),
            error: "#bdc3c7".to_string(),
            skip: "#1abc9c".to_string(),
            in_progress: "red".to_string(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 用进程环境变量覆盖
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// 用给定的变量来源覆盖，便于测试
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "ERASER_PORT")? {
            self.browser_debug_port = v;
        }
        if let Some(v) = parse_var(&lookup, "ERASER_LAUNCH")? {
            self.launch_browser = v;
        }
        if let Some(v) = parse_var(&lookup, "ERASER_HEADLESS")? {
            self.headless = v;
        }
        if let Some(v) = lookup("ERASER_CHROME") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("ERASER_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("ERASER_EMAIL") {
            self.email = Some(v);
        }
        if let Some(v) = lookup("ERASER_PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "ERASER_WAIT")? {
            self.page_wait_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "ERASER_DAYS")? {
            self.days = v;
        }
        if let Some(v) = parse_var(&lookup, "ERASER_COUNT")? {
            self.count = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "ERASER_DRY_RUN")? {
            self.dry_run = v;
        }
        if let Some(v) = parse_var(&lookup, "ERASER_VERBOSE")? {
            self.verbose_logging = v;
        }
        if let Some(v) = lookup("ERASER_AUDIT_LOG") {
            self.audit_log_file = v;
        }
        Ok(())
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_PAGE_WAIT_SECS).contains(&self.page_wait_secs) {
            return Err(invalid("page_wait_secs", "必须在 0 到 3600 秒之间"));
        }
        if self.days > MAX_RETENTION_DAYS {
            return Err(invalid("days", "不能超过 1000000 天"));
        }
        let t = &self.timing;
        for (field, value) in [
            ("timing.invoke_attempts", t.invoke_attempts),
            ("timing.resolve_attempts", t.resolve_attempts),
            ("timing.confirm_attempts", t.confirm_attempts),
            ("timing.max_pager_failures", t.max_pager_failures),
        ] {
            if value == 0 {
                return Err(invalid(field, "至少为 1"));
            }
        }
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "不能为空"));
        }
        self.login_credentials()?;
        Ok(())
    }

    /// 登录凭据，没有设置邮箱时返回 `None`
    pub fn login_credentials(&self) -> Result<Option<(&str, &str)>, ConfigError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok(Some((email, password))),
            (Some(_), None) => Err(invalid("password", "设置了邮箱但缺少 ERASER_PASSWORD")),
            (None, _) => Ok(None),
        }
    }

    /// 页面加载等待，取值非法时按 0 处理（`validate` 会先拒绝这种配置）
    pub fn page_wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.page_wait_secs).unwrap_or(Duration::ZERO)
    }

    /// 派生本次运行的不可变配置
    pub fn run_config(&self, now: NaiveDateTime) -> RunConfig {
        let t = &self.timing;
        RunConfig {
            cutoff: RetentionCutoff::days_before(now, self.days),
            target_count: self.count,
            simulated: self.dry_run,
            step_delay: Duration::from_millis(t.step_delay_ms),
            settle_delay: Duration::from_millis(t.settle_delay_ms),
            invoke_retry: RetryPolicy::new(
                t.invoke_attempts,
                Duration::from_millis(t.invoke_backoff_ms),
            ),
            resolve_retry: RetryPolicy::new(
                t.resolve_attempts,
                Duration::from_millis(t.resolve_backoff_ms),
            ),
            confirm: ConfirmPolicy {
                attempts: t.confirm_attempts,
                timeout: Duration::from_millis(t.confirm_timeout_ms),
                poll_interval: Duration::from_millis(t.confirm_poll_ms),
            },
            selectors: self.selectors.clone(),
            palette: self.palette.clone(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// 有上限的重试策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次）
    pub attempts: usize,
    /// 两次尝试之间的等待
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: usize, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }
}

/// 确认对话框的轮询参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// 轮询次数
    pub attempts: usize,
    /// 每次等待按钮可见的超时
    pub timeout: Duration,
    /// 每次轮询前的等待
    pub poll_interval: Duration,
}

/// 单次运行的不可变配置
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub cutoff: RetentionCutoff,
    pub target_count: Option<usize>,
    pub simulated: bool,
    pub step_delay: Duration,
    pub settle_delay: Duration,
    pub invoke_retry: RetryPolicy,
    pub resolve_retry: RetryPolicy,
    pub confirm: ConfirmPolicy,
    pub selectors: Selectors,
    pub palette: Palette,
}

impl RunConfig {
    /// 已达到目标数量
    pub fn target_reached(&self, counters: &Counters) -> bool {
        match self.target_count {
            Some(target) => counters.total() >= target,
            None => false,
        }
    }
}
