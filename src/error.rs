use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 会话前置条件不满足（致命）
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 页面文档操作错误
    #[error("文档操作错误: {0}")]
    Document(#[from] DocumentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(#[source] chromiumoxide::error::CdpError),
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

/// 会话错误
///
/// 在开始批量处理之前检查，任何一个都会终止整个运行
#[derive(Debug, Error)]
pub enum SessionError {
    /// 等待个人主页链接超时，说明没有登录
    #[error("未找到个人主页链接，可能尚未登录")]
    ProfileLinkMissing,
    /// 个人主页链接无法解析出用户名
    #[error("无法从链接中解析用户名: {href}")]
    ProfileNameUnparsable { href: String },
    /// 登录表单操作失败
    #[error("登录失败: {0}")]
    LoginFailed(String),
}

/// 页面文档操作错误
///
/// 这些错误在条目处理器内部被视为瞬时错误，会被重试而不会向上传播
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    Script(String),
    /// 元素句柄已失效（元素被移出了文档）
    #[error("元素已失效: {0}")]
    StaleElement(String),
    /// 脚本返回值解析失败
    #[error("脚本返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for DocumentError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DocumentError::Script(err.to_string())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 文档操作结果类型
pub type DocumentResult<T> = Result<T, DocumentError>;
