//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 加载规格表
//! - 管理中断信号
//! - 输出全局统计、日志文件和 JSON 报告
//!
//! ### `pipeline` - 流水线编排器
//! - 持有工作目录（创建 → 拆分 → 分发 → 删除）
//! - 每条指令一个并发任务
//! - 收集每个任务的结果
//!
//! ### `report` - 运行结果
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一次运行)
//!     ↓
//! pipeline (处理 SpecTable)
//!     ↓
//! workflow::PageJob (处理单条指令)
//!     ↓
//! services (能力层：split / concat / optimize)
//!     ↓
//! infrastructure (基础设施：CommandRunner / Workspace)
//! ```

pub mod app;
pub mod pipeline;
pub mod report;

pub use app::{App, RunArgs};
pub use pipeline::Pipeline;
pub use report::{JobFailure, RunResult};
