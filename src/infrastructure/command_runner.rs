//! 外部命令执行器 - 基础设施层
//!
//! 只暴露"执行一条外部命令"的能力，不认识页码、规格表或流程

use crate::error::CommandFailure;
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info};

/// 一次外部命令调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }
}

impl Display for Invocation {
    /// 以 shell 转义后的形式显示，便于复制执行
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:%@+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// 命令执行结果
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// 退出码，被信号终止时为 None
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// 非零退出转换为错误
    pub fn check(self) -> Result<CommandOutput, CommandFailure> {
        if self.success {
            Ok(self)
        } else {
            Err(CommandFailure::NonZeroExit {
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// 命令执行能力
///
/// 真实实现启动子进程；测试中可替换为确定性的假实现
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 执行命令并返回退出状态与捕获的输出
    ///
    /// 只有无法启动或超时才返回 Err，非零退出通过 `CommandOutput` 表达
    async fn invoke(&self, invocation: &Invocation) -> Result<CommandOutput, CommandFailure>;

    /// 执行命令，非零退出视为失败
    async fn check_call(&self, invocation: &Invocation) -> Result<CommandOutput, CommandFailure> {
        info!("=> {}", invocation);
        self.invoke(invocation).await?.check()
    }
}

/// 子进程执行器
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// 创建执行器，`timeout` 为单次命令的超时
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn invoke(&self, invocation: &Invocation) -> Result<CommandOutput, CommandFailure> {
        // 超时或外层取消时 future 被丢弃，kill_on_drop 负责终止子进程
        let child = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(CommandFailure::Spawn)?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| CommandFailure::Timeout {
                    secs: limit.as_secs(),
                })?,
            None => wait.await,
        }
        .map_err(CommandFailure::Spawn)?;

        debug!(
            "{} 退出: {:?} (stdout {} 字节, stderr {} 字节)",
            invocation.program,
            output.status.code(),
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
