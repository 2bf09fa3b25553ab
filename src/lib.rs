//! # PDF Repeater
//!
//! 按规格表把源 PDF 的指定页重复 N 次，每行输出一个独立文档
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `CommandRunner` - 执行外部命令的能力（真实子进程或测试替身）
//! - `Workspace` - 一次运行独占的临时目录，任何退出路径都会删除
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务包装一个外部工具
//! - `Splitter` - 拆分源文档（pdfseparate）
//! - `Concatenator` - 重复拼接单页（pdfunite）
//! - `Optimizer` - 去重压缩（gs）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条指令"的完整处理流程
//! - `JobCtx` - 上下文封装（任务序号 + 指令）
//! - `PageJob` - 状态机（检查 → 拼接 → 优化 → 清理）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 拆分一次，然后并发运行所有页任务
//! - `orchestrator/app` - 加载规格表、中断处理、汇总输出

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ErrorKind, JobError, PipelineError, PipelineResult, SpecError};
pub use infrastructure::{CancelToken, CommandRunner, Invocation, ProcessRunner, Workspace};
pub use models::{PageDirective, SpecColumns, SpecTable};
pub use orchestrator::{App, JobFailure, Pipeline, RunArgs, RunResult};
pub use workflow::{JobCtx, JobState, PageJob};
