use crate::models::SpecColumns;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 规格表中的页码列
    pub page_no_column: String,
    /// 规格表中的重复次数列
    pub repeats_column: String,
    /// 规格表中的标题列（可选）
    pub title_column: Option<String>,
    // --- 外部工具 ---
    pub splitter_program: String,
    pub concatenator_program: String,
    pub optimizer_program: String,
    /// 追加给优化器的额外参数，例如 `-dPDFSETTINGS=/printer`
    pub optimizer_extra_args: Vec<String>,
    /// 单次外部命令超时（秒），0 表示不限制
    pub command_timeout_secs: u64,
    /// 同时运行的页任务数量，0 表示不限制
    pub max_concurrent_jobs: usize,
    /// 任一任务失败时取消其余任务
    pub fail_fast: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: Option<String>,
    /// JSON 运行报告路径
    pub report_json: Option<String>,
    /// 工作目录的父目录，默认使用系统临时目录
    pub temp_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_no_column: "page_no".to_string(),
            repeats_column: "repeats".to_string(),
            title_column: None,
            splitter_program: "pdfseparate".to_string(),
            concatenator_program: "pdfunite".to_string(),
            optimizer_program: "gs".to_string(),
            optimizer_extra_args: Vec::new(),
            command_timeout_secs: 600,
            max_concurrent_jobs: 0,
            fail_fast: false,
            verbose_logging: false,
            output_log_file: None,
            report_json: None,
            temp_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// 从 TOML 文件加载，缺失字段使用默认值，再叠加环境变量
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config.merge_env())
    }

    fn merge_env(self) -> Self {
        let env = |name: &str| std::env::var(name).ok();
        Self {
            page_no_column: env("PAGE_NO_COLUMN").unwrap_or(self.page_no_column),
            repeats_column: env("REPEATS_COLUMN").unwrap_or(self.repeats_column),
            title_column: env("TITLE_COLUMN").or(self.title_column),
            splitter_program: env("SPLITTER_PROGRAM").unwrap_or(self.splitter_program),
            concatenator_program: env("CONCATENATOR_PROGRAM").unwrap_or(self.concatenator_program),
            optimizer_program: env("OPTIMIZER_PROGRAM").unwrap_or(self.optimizer_program),
            optimizer_extra_args: self.optimizer_extra_args,
            command_timeout_secs: env("COMMAND_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(self.command_timeout_secs),
            max_concurrent_jobs: env("MAX_CONCURRENT_JOBS").and_then(|v| v.parse().ok()).unwrap_or(self.max_concurrent_jobs),
            fail_fast: env("FAIL_FAST").and_then(|v| v.parse().ok()).unwrap_or(self.fail_fast),
            verbose_logging: env("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: env("OUTPUT_LOG_FILE").or(self.output_log_file),
            report_json: env("REPORT_JSON").or(self.report_json),
            temp_dir: env("PDF_REPEATER_TMPDIR").or(self.temp_dir),
        }
    }

    pub fn spec_columns(&self) -> SpecColumns {
        SpecColumns {
            page_no: self.page_no_column.clone(),
            repeats: self.repeats_column.clone(),
            title: self.title_column.clone(),
        }
    }

    /// 超时设置，0 视为不限制
    pub fn command_timeout(&self) -> Option<std::time::Duration> {
        (self.command_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.command_timeout_secs))
    }
}
