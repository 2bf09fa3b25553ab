//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、外部命令执行器、流水线
//! 2. **加载规格表**：解析失败是致命错误
//! 3. **中断处理**：Ctrl-C 触发运行级取消，工作目录照常清理
//! 4. **全局统计**：输出汇总、写入日志文件和 JSON 报告

use crate::config::Config;
use crate::infrastructure::{CancelToken, CommandRunner, ProcessRunner};
use crate::models::load_spec_table;
use crate::orchestrator::pipeline::Pipeline;
use crate::orchestrator::report::RunResult;
use crate::utils::logging::{append_log, init_log_file, log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 一次运行的输入
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub pdf_file: PathBuf,
    pub spec_tsv_file: PathBuf,
    pub output_dir: PathBuf,
}

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Pipeline,
}

impl App {
    /// 初始化应用，使用真实子进程执行外部工具
    pub fn initialize(config: Config) -> Result<Self> {
        let runner = Arc::new(ProcessRunner::new(config.command_timeout()));
        Self::with_runner(config, runner)
    }

    /// 使用指定的命令执行器初始化
    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        if let Some(path) = &config.output_log_file {
            init_log_file(path).with_context(|| format!("无法初始化日志文件: {}", path))?;
        }

        Ok(Self {
            pipeline: Pipeline::new(&config, runner),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, args: &RunArgs) -> Result<RunResult> {
        let table = load_spec_table(&args.spec_tsv_file, &self.config.spec_columns())
            .with_context(|| format!("无法加载规格表: {}", args.spec_tsv_file.display()))?;

        log_startup(
            &args.pdf_file.display().to_string(),
            table.len(),
            self.config.max_concurrent_jobs,
        );

        if table.is_empty() {
            warn!("⚠️ 规格表中没有任何指令，程序结束");
            return Ok(RunResult::default());
        }

        let cancel = CancelToken::new();
        let interrupt = spawn_interrupt_watcher(cancel.clone());

        let result = self
            .pipeline
            .run_with_cancel(&args.pdf_file, &table, &args.output_dir, &cancel)
            .await;
        interrupt.abort();
        let result = result?;

        print_final_stats(&result, self.config.output_log_file.as_deref());
        self.write_reports(&result)?;

        Ok(result)
    }

    fn write_reports(&self, result: &RunResult) -> Result<()> {
        if let Some(log_file) = &self.config.output_log_file {
            let mut text = format!(
                "成功: {}/{}\n",
                result.succeeded,
                result.total()
            );
            text.push_str(&result.failure_summary(usize::MAX));
            append_log(log_file, &text)?;
        }

        if let Some(report) = &self.config.report_json {
            result.write_json(Path::new(report))?;
            info!("📝 运行报告已写入: {}", report);
        }
        Ok(())
    }
}

/// 收到 Ctrl-C 时触发取消
fn spawn_interrupt_watcher(cancel: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("⚠️ 收到中断信号，正在取消所有任务...");
                cancel.cancel();
            }
            Err(e) => error!("无法监听中断信号: {}", e),
        }
    })
}
