//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器资源和会话检查
//! - 加载动态页面、调度多轮扫描
//! - 输出全局统计信息
//!
//! ### `batch_controller` - 单轮处理
//! - 对一次扫描的条目快照逐个调用 `EntryProcessor`
//! - 达到目标数量时立即停止
//!
//! ## 层次关系
//!
//! ```text
//! app (多轮扫描)
//!     ↓
//! batch_controller (处理 Vec<Entry>)
//!     ↓
//! workflow::EntryProcessor (处理单个 Entry)
//!     ↓
//! services (能力层：classifier / resolver / confirmation)
//!     ↓
//! infrastructure (基础设施：Document / JsExecutor)
//! ```

pub mod app;
pub mod batch_controller;

pub use app::{App, RunSummary};
pub use batch_controller::{process_batch, scan_entries, BatchReport, EntryRecord};
