//! 命令行参数
//!
//! 只有显式给出的参数才会覆盖配置文件和环境变量

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "activity_eraser", version, about = "批量删除或隐藏活动记录中的动态")]
pub struct Cli {
    /// TOML 配置文件
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 页面加载后的等待时间（秒）
    #[arg(long, value_name = "SECS")]
    pub wait: Option<f64>,

    /// 模拟运行：只展示会处理哪些条目，最后一步点取消
    #[arg(long)]
    pub dry: bool,

    /// 只处理多少天以前的条目（0 表示不过滤）
    #[arg(long)]
    pub days: Option<u32>,

    /// 最多删除/隐藏多少条（默认不限）
    #[arg(long)]
    pub count: Option<usize>,

    /// 浏览器调试端口
    #[arg(long)]
    pub port: Option<u16>,

    /// 自行启动浏览器而不是连接已打开的浏览器
    #[arg(long)]
    pub launch: bool,

    /// 自行启动时使用无头模式
    #[arg(long, requires = "launch")]
    pub headless: bool,

    /// 登录邮箱（密码从 ERASER_PASSWORD 读取）
    #[arg(long)]
    pub email: Option<String>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 把显式给出的参数覆盖到配置上
    pub fn apply(&self, config: &mut Config) {
        if let Some(wait) = self.wait {
            config.page_wait_secs = wait;
        }
        if self.dry {
            config.dry_run = true;
        }
        if let Some(days) = self.days {
            config.days = days;
        }
        if let Some(count) = self.count {
            config.count = Some(count);
        }
        if let Some(port) = self.port {
            config.browser_debug_port = port;
        }
        if self.launch {
            config.launch_browser = true;
        }
        if self.headless {
            config.headless = true;
        }
        if let Some(email) = &self.email {
            config.email = Some(email.clone());
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}
