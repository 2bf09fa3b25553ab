//! 错误类型
//!
//! 分三层：
//! - `SpecError`：规格表解析错误（致命，整个运行无法开始）
//! - `PipelineError`：运行级错误（致命，跳过剩余阶段直接清理）
//! - `JobError`：单页任务错误（隔离，不影响其他任务）

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 规格表解析错误
#[derive(Debug, Error)]
pub enum SpecError {
    /// 必需列不存在
    #[error("规格表缺少必需列: {column}")]
    MissingColumn { column: String },

    /// 记录格式错误（数值无法解析等）
    #[error("第 {line} 行记录格式错误 (列 {column}, 值 '{value}'): {reason}")]
    MalformedRecord {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    /// 读取规格表失败
    #[error("读取规格表失败: {0}")]
    Read(#[from] csv::Error),
}

/// 运行级致命错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 创建临时工作目录失败
    #[error("无法创建工作目录: {0}")]
    Workspace(#[source] std::io::Error),

    /// 拆分源文档失败
    #[error("拆分失败 ({command}): {reason}{}", stderr_suffix(.stderr))]
    SplitFailed {
        command: String,
        reason: String,
        stderr: String,
    },

    /// 输出目录不可用
    #[error("无法创建输出目录 {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 运行被取消（拆分阶段）
    #[error("运行已取消")]
    Cancelled,
}

/// 非空的诊断输出换行附在错误信息后
fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

/// 外部命令执行失败的原因
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// 进程以非零状态退出
    #[error("退出状态 {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "未知(被信号终止)".to_string()))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// 超时
    #[error("超过 {secs} 秒未完成")]
    Timeout { secs: u64 },

    /// 无法启动进程
    #[error("无法启动进程: {0}")]
    Spawn(#[source] std::io::Error),
}

impl CommandFailure {
    /// 外部命令的诊断输出（stderr）
    pub fn stderr(&self) -> &str {
        match self {
            CommandFailure::NonZeroExit { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// 单页任务错误
#[derive(Debug, Error)]
pub enum JobError {
    /// 规格表引用的页码在源文档中不存在
    #[error("页 {page} 不存在 (未找到 {})", .path.display())]
    MissingPage { page: u32, path: PathBuf },

    /// 拼接阶段失败
    #[error("拼接失败 ({command}): {failure}")]
    Concatenation {
        command: String,
        failure: CommandFailure,
    },

    /// 优化阶段失败
    #[error("优化失败 ({command}): {failure}")]
    Optimization {
        command: String,
        failure: CommandFailure,
    },

    /// 任务被取消
    #[error("任务已取消")]
    Cancelled,

    /// 任务本身崩溃（panic）
    #[error("任务执行失败: {0}")]
    Aborted(String),
}

impl JobError {
    /// 映射到报告用的错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::MissingPage { .. } => ErrorKind::MissingPage,
            JobError::Concatenation {
                failure: CommandFailure::Timeout { .. },
                ..
            }
            | JobError::Optimization {
                failure: CommandFailure::Timeout { .. },
                ..
            } => ErrorKind::Timeout,
            JobError::Concatenation { .. } => ErrorKind::Concatenation,
            JobError::Optimization { .. } => ErrorKind::Optimization,
            JobError::Cancelled => ErrorKind::Cancelled,
            JobError::Aborted(_) => ErrorKind::Aborted,
        }
    }

    /// 外部命令的诊断输出（如果有）
    pub fn diagnostics(&self) -> &str {
        match self {
            JobError::Concatenation { failure, .. } | JobError::Optimization { failure, .. } => {
                failure.stderr()
            }
            _ => "",
        }
    }
}

/// 报告中使用的错误类别，JSON 与文本报告使用同一名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "MissingPageError")]
    MissingPage,
    #[serde(rename = "ConcatenationError")]
    Concatenation,
    #[serde(rename = "OptimizationError")]
    Optimization,
    #[serde(rename = "TimeoutError")]
    Timeout,
    Cancelled,
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MissingPage => "MissingPageError",
            ErrorKind::Concatenation => "ConcatenationError",
            ErrorKind::Optimization => "OptimizationError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// 运行级结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_distinguished_from_exit_status() {
        let timeout = JobError::Optimization {
            command: "gs".to_string(),
            failure: CommandFailure::Timeout { secs: 5 },
        };
        let exit = JobError::Optimization {
            command: "gs".to_string(),
            failure: CommandFailure::NonZeroExit {
                code: Some(1),
                stderr: "bad pdf".to_string(),
            },
        };

        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(exit.kind(), ErrorKind::Optimization);
        assert_eq!(exit.diagnostics(), "bad pdf");
        assert_eq!(timeout.diagnostics(), "");
    }

    #[test]
    fn test_kind_display_names() {
        assert_eq!(ErrorKind::MissingPage.to_string(), "MissingPageError");
        assert_eq!(ErrorKind::Timeout.to_string(), "TimeoutError");
    }

    #[test]
    fn test_serialized_kind_matches_display() {
        for kind in [
            ErrorKind::MissingPage,
            ErrorKind::Concatenation,
            ErrorKind::Optimization,
            ErrorKind::Timeout,
            ErrorKind::Cancelled,
            ErrorKind::Aborted,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.to_string());
        }
    }

    #[test]
    fn test_split_failure_message_includes_stderr() {
        let err = PipelineError::SplitFailed {
            command: "pdfseparate in.pdf sep_%08d.pdf".to_string(),
            reason: "退出状态 1".to_string(),
            stderr: "Syntax Error: Couldn't read xref table\n".to_string(),
        };
        let shown = err.to_string();
        assert!(shown.starts_with("拆分失败 (pdfseparate"));
        assert!(shown.ends_with("退出状态 1\nSyntax Error: Couldn't read xref table"));

        let quiet = PipelineError::SplitFailed {
            command: "pdfseparate".to_string(),
            reason: "未生成任何页面文件".to_string(),
            stderr: String::new(),
        };
        assert_eq!(quiet.to_string(), "拆分失败 (pdfseparate): 未生成任何页面文件");
    }
}
