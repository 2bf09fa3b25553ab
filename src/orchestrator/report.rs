//! 运行结果与汇总

use crate::error::{ErrorKind, JobError};
use crate::models::PageDirective;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 单个失败任务
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub directive: PageDirective,
    pub error_kind: ErrorKind,
    pub message: String,
    /// 外部命令的 stderr
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diagnostics: String,
}

impl JobFailure {
    pub fn new(directive: PageDirective, error: &JobError) -> Self {
        Self {
            directive,
            error_kind: error.kind(),
            message: error.to_string(),
            diagnostics: error.diagnostics().trim().to_string(),
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub succeeded: usize,
    /// 拆分出的源文档页数
    pub source_pages: usize,
    pub outputs: Vec<PathBuf>,
    /// 按任务顺序排列
    pub failures: Vec<JobFailure>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    /// 人类可读的失败汇总，每个失败一段
    pub fn failure_summary(&self, max_diagnostics: usize) -> String {
        let mut summary = String::new();
        for failure in &self.failures {
            summary.push_str(&format!(
                "✗ {} [{}] {}\n",
                failure.directive, failure.error_kind, failure.message
            ));
            if !failure.diagnostics.is_empty() {
                for line in crate::utils::logging::truncate_text(&failure.diagnostics, max_diagnostics).lines() {
                    summary.push_str(&format!("    {}\n", line));
                }
            }
        }
        summary
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("无法写入运行报告: {}", path.display()))?;
        Ok(())
    }
}
