//! 基础设施层
//!
//! 持有稀缺资源（Page），只暴露能力

pub mod chromium_document;
pub mod document;
pub mod js_executor;

pub use chromium_document::ChromiumDocument;
pub use document::{Document, ElementHandle, Locator, WaitState};
pub use js_executor::JsExecutor;
