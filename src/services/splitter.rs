//! 拆分服务 - 业务能力层
//!
//! 只负责"把源文档拆成单页文件"，每次运行调用一次

use crate::error::{PipelineError, PipelineResult};
use crate::infrastructure::{CommandRunner, Invocation, Workspace};
use std::path::Path;
use tracing::info;

pub struct Splitter {
    program: String,
}

impl Splitter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 构建拆分命令：`<program> <source> <workspace>/sep_%08d.pdf`
    pub fn invocation(&self, source: &Path, workspace: &Workspace) -> Invocation {
        Invocation::new(&self.program)
            .path_arg(source)
            .path_arg(&workspace.split_pattern())
    }

    /// 拆分源文档，返回生成的页数
    ///
    /// 非零退出、超时或没有生成任何文件都视为致命错误
    pub async fn split(
        &self,
        runner: &dyn CommandRunner,
        source: &Path,
        workspace: &Workspace,
    ) -> PipelineResult<usize> {
        let invocation = self.invocation(source, workspace);
        let command = invocation.to_string();

        runner
            .check_call(&invocation)
            .await
            .map_err(|failure| PipelineError::SplitFailed {
                command: command.clone(),
                reason: failure.to_string(),
                stderr: failure.stderr().to_string(),
            })?;

        let pages = workspace
            .count_split_pages()
            .await
            .map_err(|e| PipelineError::SplitFailed {
                command: command.clone(),
                reason: format!("无法读取工作目录: {}", e),
                stderr: String::new(),
            })?;

        if pages == 0 {
            return Err(PipelineError::SplitFailed {
                command,
                reason: "未生成任何页面文件".to_string(),
                stderr: String::new(),
            });
        }

        info!("✓ 拆分完成，共 {} 页", pages);
        Ok(pages)
    }
}
