use anyhow::Result;
use clap::Parser;
use pdf_repeater::utils::logging;
use pdf_repeater::{App, Config, RunArgs};
use std::path::PathBuf;
use std::process::ExitCode;

/// 按 TSV 规格表把 PDF 的指定页重复输出为独立文件
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// 源 PDF 文件
    #[arg(long)]
    pdf_file: PathBuf,

    /// TSV 规格表
    #[arg(long)]
    spec_tsv_file: PathBuf,

    /// 输出目录（不存在时自动创建）
    #[arg(long)]
    output_dir: PathBuf,

    #[arg(long)]
    page_no_column: Option<String>,

    #[arg(long)]
    repeats_column: Option<String>,

    #[arg(long)]
    title_column: Option<String>,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 同时运行的页任务数量，0 表示不限制
    #[arg(long)]
    max_concurrent_jobs: Option<usize>,

    /// 单次外部命令超时（秒），0 表示不限制
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// 任一任务失败时取消其余任务
    #[arg(long)]
    fail_fast: bool,

    /// 写入 JSON 运行报告
    #[arg(long)]
    report_json: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 配置文件（或环境变量）打底，命令行参数覆盖
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::from_env(),
        };

        if let Some(column) = &self.page_no_column {
            config.page_no_column = column.clone();
        }
        if let Some(column) = &self.repeats_column {
            config.repeats_column = column.clone();
        }
        if let Some(column) = &self.title_column {
            config.title_column = Some(column.clone());
        }
        if let Some(jobs) = self.max_concurrent_jobs {
            config.max_concurrent_jobs = jobs;
        }
        if let Some(secs) = self.timeout_secs {
            config.command_timeout_secs = secs;
        }
        if let Some(report) = &self.report_json {
            config.report_json = Some(report.to_string_lossy().into_owned());
        }
        config.fail_fast |= self.fail_fast;
        config.verbose_logging |= self.verbose;

        Ok(config)
    }

    fn run_args(&self) -> RunArgs {
        RunArgs {
            pdf_file: self.pdf_file.clone(),
            spec_tsv_file: self.spec_tsv_file.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.resolve_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let result = App::initialize(config)?.run(&cli.run_args()).await?;

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("\n{} 个指令处理失败:", result.failures.len());
        eprint!("{}", result.failure_summary(2000));
        Ok(ExitCode::FAILURE)
    }
}
