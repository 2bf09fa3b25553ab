//! 页任务上下文
//!
//! 封装"我正在处理第几个任务、哪一页"这一信息

use crate::models::PageDirective;
use std::fmt::Display;

/// 页任务上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 任务序号（按页码排序后，从 0 开始）
    pub job_index: usize,

    /// 任务总数（仅用于日志显示）
    pub total_jobs: usize,

    /// 该任务对应的指令
    pub directive: PageDirective,
}

impl JobCtx {
    pub fn new(job_index: usize, total_jobs: usize, directive: PageDirective) -> Self {
        Self {
            job_index,
            total_jobs,
            directive,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {}/{} 页#{}]",
            self.job_index + 1,
            self.total_jobs,
            self.directive.page
        )
    }
}
