//! # Activity Eraser
//!
//! 批量删除或隐藏活动记录中的动态
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `Document` - 文档访问接口：查找、等待、点击、标记
//! - `ChromiumDocument` / `JsExecutor` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个条目
//! - `EntryClassifier` - 按时间戳判断是否处理
//! - `PurgeActionResolver` - 在菜单中找出删除/隐藏选项
//! - `ConfirmationHandler` - 确认（或模拟模式下取消）对话框
//! - `AuditWriter` - 写审计日志
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个条目"的完整处理流程
//! - `EntryCtx` - 上下文封装（第几轮 + 第几个条目）
//! - `EntryProcessor` - 状态机（菜单 → 选项 → 确认 → 记账）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_controller` - 单轮条目快照处理
//! - `orchestrator/app` - 会话检查、加载动态、多轮调度

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, RunConfig};
pub use error::{AppError, AppResult};
pub use infrastructure::{
    ChromiumDocument, Document, ElementHandle, JsExecutor, Locator, WaitState,
};
pub use models::{
    Counters, Entry, EntryId, ErrorReason, HandledSet, Outcome, PurgeAction, SkipReason,
};
pub use orchestrator::{process_batch, App, BatchReport};
pub use workflow::{EntryCtx, EntryProcessor};
