//! 审计日志写入服务 - 业务能力层
//!
//! 只负责把跳过和出错的条目追加到审计文件，不关心流程

use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::debug;

use crate::error::AppResult;
use crate::models::{EntryId, Outcome};

/// 审计日志写入服务
pub struct AuditWriter {
    audit_file_path: String,
}

impl AuditWriter {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            audit_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.audit_file_path
    }

    /// 写入文件头（覆盖旧文件）
    pub fn init(&self, simulated: bool) -> AppResult<()> {
        let header = format!(
            "{}\n动态清理审计日志 - {}{}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            if simulated { " [模拟]" } else { "" },
            "=".repeat(60)
        );
        fs::write(&self.audit_file_path, header)?;
        Ok(())
    }

    /// 追加一条记录
    pub fn write(
        &self,
        id: &EntryId,
        timestamp_text: Option<&str>,
        outcome: Outcome,
    ) -> AppResult<()> {
        debug!("写入审计: {} -> {}", id, outcome);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_file_path)?;

        let line = format!(
            "{} | 条目 {} | 时间戳 {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            id,
            timestamp_text.unwrap_or("-"),
            outcome
        );
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
