//! 流水线编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **工作目录**：创建并在任何退出路径上删除临时目录
//! 2. **拆分**：调用一次拆分工具，完成后才开始任何页任务
//! 3. **并发分发**：每条指令一个任务，全部并发（可选上限）
//! 4. **汇总**：等待全部任务结束，收集成功数和按指令归属的错误
//!
//! 单个任务失败不会取消其他任务，除非启用 fail-fast

use crate::config::Config;
use crate::error::{JobError, PipelineError, PipelineResult};
use crate::infrastructure::{CancelToken, CommandRunner, Workspace};
use crate::models::SpecTable;
use crate::orchestrator::report::{JobFailure, RunResult};
use crate::services::{Concatenator, Optimizer, Splitter};
use crate::workflow::{JobCtx, JobOutcome, PageJob};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 任务共享的只读工具
struct JobTools {
    concatenator: Concatenator,
    optimizer: Optimizer,
}

pub struct Pipeline {
    runner: Arc<dyn CommandRunner>,
    splitter: Splitter,
    tools: Arc<JobTools>,
    max_concurrent_jobs: usize,
    fail_fast: bool,
    workspace_parent: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            splitter: Splitter::new(&config.splitter_program),
            tools: Arc::new(JobTools {
                concatenator: Concatenator::new(&config.concatenator_program),
                optimizer: Optimizer::new(
                    &config.optimizer_program,
                    config.optimizer_extra_args.clone(),
                ),
            }),
            max_concurrent_jobs: config.max_concurrent_jobs,
            fail_fast: config.fail_fast,
            workspace_parent: config.temp_dir.as_ref().map(PathBuf::from),
        }
    }

    /// 运行流水线，不支持外部取消
    pub async fn run(
        &self,
        source: &Path,
        table: &SpecTable,
        output_dir: &Path,
    ) -> PipelineResult<RunResult> {
        self.run_with_cancel(source, table, output_dir, &CancelToken::new())
            .await
    }

    /// 运行流水线；`cancel` 触发后终止进行中的任务，工作目录照常删除
    pub async fn run_with_cancel(
        &self,
        source: &Path,
        table: &SpecTable,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> PipelineResult<RunResult> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| PipelineError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let workspace = match &self.workspace_parent {
            Some(parent) => Workspace::acquire_in(parent)?,
            None => Workspace::acquire()?,
        };
        let result = self
            .run_in(&workspace, source, table, output_dir, cancel)
            .await;
        workspace.release();
        result
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        source: &Path,
        table: &SpecTable,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> PipelineResult<RunResult> {
        info!("✂️ 正在拆分 {}", source.display());
        let split = tokio::select! {
            pages = self.splitter.split(self.runner.as_ref(), source, workspace) => pages,
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        };
        let source_pages = split?;

        warn_duplicate_outputs(table);

        let directives = table.sorted_by_page();
        let total = directives.len();
        let semaphore = (self.max_concurrent_jobs > 0)
            .then(|| Arc::new(Semaphore::new(self.max_concurrent_jobs)));
        info!(
            "🚀 启动 {} 个页任务 (并发上限: {})",
            total,
            semaphore
                .as_ref()
                .map(|_| self.max_concurrent_jobs.to_string())
                .unwrap_or_else(|| "无".to_string())
        );

        let mut handles: Vec<(_, JoinHandle<Result<JobOutcome, JobError>>)> =
            Vec::with_capacity(total);
        for (job_index, directive) in directives.into_iter().enumerate() {
            let job = PageJob::new(
                JobCtx::new(job_index, total, directive.clone()),
                workspace.split_page_path(directive.page),
                workspace.repeated_page_path(job_index, directive.page),
                output_dir.join(directive.output_filename()),
            );
            let handle = tokio::spawn(run_job(
                job,
                self.runner.clone(),
                self.tools.clone(),
                semaphore.clone(),
                cancel.clone(),
                self.fail_fast,
            ));
            handles.push((directive, handle));
        }

        // 等待所有任务结束
        let mut result = RunResult {
            source_pages,
            ..Default::default()
        };
        for (directive, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => {
                    result.succeeded += 1;
                    result.outputs.push(outcome.output_path);
                }
                Ok(Err(e)) => result.failures.push(JobFailure::new(directive, &e)),
                Err(e) => {
                    error!("[页 {}] 任务执行失败: {}", directive.page, e);
                    let aborted = JobError::Aborted(e.to_string());
                    result.failures.push(JobFailure::new(directive, &aborted));
                }
            }
        }

        Ok(result)
    }
}

async fn run_job(
    mut job: PageJob,
    runner: Arc<dyn CommandRunner>,
    tools: Arc<JobTools>,
    semaphore: Option<Arc<Semaphore>>,
    cancel: CancelToken,
    fail_fast: bool,
) -> Result<JobOutcome, JobError> {
    let ctx = job.ctx().clone();
    let work = async {
        let _permit = match semaphore {
            Some(semaphore) => Some(
                semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| JobError::Aborted(e.to_string()))?,
            ),
            None => None,
        };
        job.run(runner.as_ref(), &tools.concatenator, &tools.optimizer)
            .await
    };

    // 取消时丢弃 work，进行中的子进程随之被终止
    let result = tokio::select! {
        result = work => result,
        _ = cancel.cancelled() => {
            warn!("{} ⚠️ 已取消", ctx);
            Err(JobError::Cancelled)
        }
    };

    if fail_fast {
        if let Err(e) = &result {
            if !matches!(e, JobError::Cancelled) {
                warn!("{} fail-fast: 取消其余任务", ctx);
                cancel.cancel();
            }
        }
    }
    result
}

fn warn_duplicate_outputs(table: &SpecTable) {
    for (name, directives) in table.duplicate_output_names() {
        let pages: Vec<String> = directives.iter().map(|d| d.page.to_string()).collect();
        warn!(
            "⚠️ {} 条指令输出到同一文件 {} (页: {})，后完成者会覆盖先完成者",
            directives.len(),
            name,
            pages.join(", ")
        );
    }
    for (directive, name) in table.output_plan() {
        debug!("{} → {}", directive, name);
    }
}
