//! 临时工作目录 - 基础设施层
//!
//! 一次运行独占一个临时目录，保存拆分出的单页文件和各任务的中间文件。
//! `release()` 或 drop 时递归删除，删除失败只记录日志。

use crate::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// 拆分工具使用的命名模式（1 开始的页码，8 位补零）
pub const SEPARATED_PATTERN: &str = "sep_%08d.pdf";

/// 工作目录句柄
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// 在系统临时目录下创建新的空目录
    pub fn acquire() -> PipelineResult<Self> {
        Self::from_builder(tempfile::Builder::new().prefix("pdf-repeater-").tempdir())
    }

    /// 在指定父目录下创建
    pub fn acquire_in(parent: &Path) -> PipelineResult<Self> {
        Self::from_builder(
            tempfile::Builder::new()
                .prefix("pdf-repeater-")
                .tempdir_in(parent),
        )
    }

    fn from_builder(dir: std::io::Result<TempDir>) -> PipelineResult<Self> {
        let dir = dir.map_err(PipelineError::Workspace)?;
        let path = dir.path().to_path_buf();
        debug!("工作目录已创建: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 传给拆分工具的输出模式路径
    pub fn split_pattern(&self) -> PathBuf {
        self.path.join(SEPARATED_PATTERN)
    }

    /// 第 `page` 页拆分后的文件路径
    pub fn split_page_path(&self, page: u32) -> PathBuf {
        self.path.join(split_page_filename(page))
    }

    /// 任务的重复页中间文件，带任务序号以免同页指令互相覆盖
    pub fn repeated_page_path(&self, job_index: usize, page: u32) -> PathBuf {
        self.path.join(format!("temp-{}-{}.pdf", job_index, page))
    }

    /// 统计已拆分出的单页文件数量
    pub async fn count_split_pages(&self) -> std::io::Result<usize> {
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if is_split_page_filename(&name.to_string_lossy()) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// 递归删除目录，恰好执行一次
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("工作目录已删除: {}", self.path.display()),
                Err(e) => warn!("⚠️ 无法删除工作目录 {}: {}", self.path.display(), e),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release_inner();
    }
}

pub fn split_page_filename(page: u32) -> String {
    format!("sep_{:08}.pdf", page)
}

fn is_split_page_filename(name: &str) -> bool {
    name.strip_prefix("sep_")
        .and_then(|rest| rest.strip_suffix(".pdf"))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
