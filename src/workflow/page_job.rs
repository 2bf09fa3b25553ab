//! 页任务流程 - 流程层
//!
//! 核心职责：定义"一条指令"的完整处理流程
//!
//! 状态顺序：
//! 1. Pending：检查拆分出的单页文件是否存在
//! 2. Concatenating：重复拼接，写入任务自己的中间文件
//! 3. Optimizing：优化并写入最终输出文件
//! 4. Done：删除中间文件（失败只记警告）

use crate::error::JobError;
use crate::infrastructure::CommandRunner;
use crate::services::{Concatenator, Optimizer};
use crate::workflow::job_ctx::JobCtx;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Concatenating,
    Optimizing,
    Done,
    Failed,
}

/// 成功任务的产出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub output_path: PathBuf,
    /// 输出文档页数（= 重复次数）
    pub pages: u32,
}

/// 单页任务
///
/// - 只读共享的单页文件
/// - 只写自己的中间文件和输出文件
/// - 不持有任何共享可变状态
pub struct PageJob {
    ctx: JobCtx,
    split_page_path: PathBuf,
    temp_path: PathBuf,
    output_path: PathBuf,
    state: JobState,
}

impl PageJob {
    pub fn new(
        ctx: JobCtx,
        split_page_path: PathBuf,
        temp_path: PathBuf,
        output_path: PathBuf,
    ) -> Self {
        Self {
            ctx,
            split_page_path,
            temp_path,
            output_path,
            state: JobState::Pending,
        }
    }

    pub fn ctx(&self) -> &JobCtx {
        &self.ctx
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// 执行完整流程，失败时状态停在 `Failed`
    pub async fn run(
        &mut self,
        runner: &dyn CommandRunner,
        concatenator: &Concatenator,
        optimizer: &Optimizer,
    ) -> Result<JobOutcome, JobError> {
        match self.execute(runner, concatenator, optimizer).await {
            Ok(outcome) => {
                self.transition(JobState::Done);
                self.discard_temp().await;
                info!("{} ✅ 已生成 {}", self.ctx, self.output_path.display());
                Ok(outcome)
            }
            Err(e) => {
                self.transition(JobState::Failed);
                error!("{} ❌ {}", self.ctx, e);
                Err(e)
            }
        }
    }

    async fn execute(
        &mut self,
        runner: &dyn CommandRunner,
        concatenator: &Concatenator,
        optimizer: &Optimizer,
    ) -> Result<JobOutcome, JobError> {
        let directive = &self.ctx.directive;
        if !tokio::fs::try_exists(&self.split_page_path)
            .await
            .unwrap_or(false)
        {
            return Err(JobError::MissingPage {
                page: directive.page,
                path: self.split_page_path.clone(),
            });
        }
        let (page, repeats) = (directive.page, directive.repeats);

        self.transition(JobState::Concatenating);
        info!("{} 📄 重复第 {} 页 {} 次", self.ctx, page, repeats);
        concatenator
            .concat(runner, &self.split_page_path, repeats, &self.temp_path)
            .await?;

        self.transition(JobState::Optimizing);
        optimizer
            .optimize(runner, &self.temp_path, &self.output_path)
            .await?;

        Ok(JobOutcome {
            output_path: self.output_path.clone(),
            pages: repeats,
        })
    }

    fn transition(&mut self, to: JobState) {
        debug!("{} {:?} → {:?}", self.ctx, self.state, to);
        self.state = to;
    }

    /// 中间文件在优化成功后已无用，删除失败不影响结果
    async fn discard_temp(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.temp_path).await {
            warn!(
                "{} ⚠️ 无法删除中间文件 {}: {}",
                self.ctx,
                self.temp_path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandFailure;
    use crate::infrastructure::{CommandOutput, Invocation};
    use crate::models::PageDirective;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录调用并按程序名决定成败的执行器
    struct ScriptedRunner {
        fail_program: Option<&'static str>,
        /// 成功退出但不写输出文件的程序
        silent_program: Option<&'static str>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        fn new(fail_program: Option<&'static str>) -> Self {
            Self {
                fail_program,
                silent_program: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn invoke(&self, invocation: &Invocation) -> Result<CommandOutput, CommandFailure> {
            self.calls.lock().unwrap().push(invocation.clone());
            let failed = self.fail_program == Some(invocation.program.as_str());
            let silent = self.silent_program == Some(invocation.program.as_str());
            if !failed && !silent {
                let out = match invocation.args.iter().position(|a| a == "-o") {
                    Some(idx) => invocation.args.get(idx + 1),
                    None => invocation.args.last(),
                };
                if let Some(out) = out {
                    std::fs::write(out, b"pdf").unwrap();
                }
            }
            Ok(CommandOutput {
                code: Some(if failed { 1 } else { 0 }),
                success: !failed,
                stdout: String::new(),
                stderr: if failed { "tool error".to_string() } else { String::new() },
            })
        }
    }

    fn job_in(dir: &std::path::Path, page: u32, repeats: u32) -> PageJob {
        let ctx = JobCtx::new(0, 1, PageDirective::new(page, repeats, None));
        PageJob::new(
            ctx,
            dir.join(format!("sep_{:08}.pdf", page)),
            dir.join(format!("temp-0-{}.pdf", page)),
            dir.join("out.pdf"),
        )
    }

    fn tools() -> (Concatenator, Optimizer) {
        (Concatenator::new("pdfunite"), Optimizer::new("gs", Vec::new()))
    }

    #[tokio::test]
    async fn test_missing_page_skips_external_tools() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(None);
        let (concatenator, optimizer) = tools();
        let mut job = job_in(dir.path(), 99, 1);

        let err = job.run(&runner, &concatenator, &optimizer).await.unwrap_err();

        assert!(matches!(err, JobError::MissingPage { page: 99, .. }));
        assert_eq!(job.state(), JobState::Failed);
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sep_00000001.pdf"), b"page").unwrap();
        let runner = ScriptedRunner::new(None);
        let (concatenator, optimizer) = tools();
        let mut job = job_in(dir.path(), 1, 3);

        let outcome = job.run(&runner, &concatenator, &optimizer).await.unwrap();

        assert_eq!(outcome.pages, 3);
        assert_eq!(job.state(), JobState::Done);
        assert!(outcome.output_path.exists());
        assert!(!dir.path().join("temp-0-1.pdf").exists());

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "pdfunite");
        assert_eq!(calls[0].args.len(), 4);
        assert_eq!(calls[1].program, "gs");
    }

    #[tokio::test]
    async fn test_temp_cleanup_failure_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sep_00000001.pdf"), b"page").unwrap();
        let runner = ScriptedRunner {
            silent_program: Some("pdfunite"),
            ..ScriptedRunner::new(None)
        };
        let (concatenator, optimizer) = tools();
        let mut job = job_in(dir.path(), 1, 2);

        let outcome = job.run(&runner, &concatenator, &optimizer).await.unwrap();

        // 中间文件从未生成，删除失败只记警告
        assert!(!dir.path().join("temp-0-1.pdf").exists());
        assert_eq!(job.state(), JobState::Done);
        assert_eq!(outcome.pages, 2);
        assert!(outcome.output_path.exists());
    }

    #[tokio::test]
    async fn test_concatenation_failure_stops_before_optimizer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sep_00000001.pdf"), b"page").unwrap();
        let runner = ScriptedRunner::new(Some("pdfunite"));
        let (concatenator, optimizer) = tools();
        let mut job = job_in(dir.path(), 1, 2);

        let err = job.run(&runner, &concatenator, &optimizer).await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Concatenation);
        assert_eq!(err.diagnostics(), "tool error");
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_optimization_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sep_00000001.pdf"), b"page").unwrap();
        let runner = ScriptedRunner::new(Some("gs"));
        let (concatenator, optimizer) = tools();
        let mut job = job_in(dir.path(), 1, 2);

        let err = job.run(&runner, &concatenator, &optimizer).await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Optimization);
        assert_eq!(job.state(), JobState::Failed);
        assert!(!dir.path().join("out.pdf").exists());
    }
}
