//! 测试用的假外部工具
//!
//! "文档"是文本文件，一行一页：
//! - pdfseparate 每行写一个 sep_XXXXXXXX.pdf
//! - pdfunite 按顺序拼接输入文件
//! - gs 把 `-o` 后的输出写成输入的副本

#![allow(dead_code)]

use async_trait::async_trait;
use pdf_repeater::error::CommandFailure;
use pdf_repeater::infrastructure::workspace::split_page_filename;
use pdf_repeater::infrastructure::{CommandOutput, CommandRunner, Invocation};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeTools {
    pub fail_split: bool,
    /// 输出文件名在此集合中时 gs 以非零状态退出
    pub fail_optimize: HashSet<String>,
    /// 输出文件名在此集合中时 gs 超时
    pub timeout_optimize: HashSet<String>,
    /// 拼接这些页时长时间挂起
    pub hang_concat_pages: HashSet<u32>,
    /// 每次拼接的耗时
    pub concat_delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: Mutex<Vec<Invocation>>,
}

impl FakeTools {
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }

    fn ok() -> CommandOutput {
        CommandOutput {
            code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    fn failed(stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(1),
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn separate(&self, args: &[PathBuf]) -> CommandOutput {
        if self.fail_split {
            return Self::failed("Syntax Error: Couldn't read xref table");
        }
        let source = std::fs::read_to_string(&args[0]).unwrap_or_default();
        let pattern = args[1].to_string_lossy().into_owned();
        for (idx, line) in source.lines().enumerate() {
            let path = pattern.replace("%08d", &format!("{:08}", idx + 1));
            std::fs::write(path, format!("{}\n", line)).unwrap();
        }
        Self::ok()
    }

    async fn unite(&self, args: &[PathBuf]) -> CommandOutput {
        let (output, inputs) = args.split_last().unwrap();
        let hang = self
            .hang_concat_pages
            .iter()
            .any(|&page| inputs[0].ends_with(split_page_filename(page)));
        if hang {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if !self.concat_delay.is_zero() {
            tokio::time::sleep(self.concat_delay).await;
        }

        let mut content = String::new();
        for input in inputs {
            content.push_str(&std::fs::read_to_string(input).unwrap());
        }
        std::fs::write(output, content).unwrap();
        Self::ok()
    }

    fn optimize(&self, args: &[PathBuf]) -> Result<CommandOutput, CommandFailure> {
        let o = args.iter().position(|a| a == Path::new("-o")).unwrap();
        let output = &args[o + 1];
        let input = args.last().unwrap();
        let name = output.file_name().unwrap().to_string_lossy().into_owned();

        if self.timeout_optimize.contains(&name) {
            return Err(CommandFailure::Timeout { secs: 1 });
        }
        if self.fail_optimize.contains(&name) {
            return Ok(Self::failed("Error: /undefined in --run--"));
        }
        std::fs::copy(input, output).unwrap();
        Ok(Self::ok())
    }
}

#[async_trait]
impl CommandRunner for FakeTools {
    async fn invoke(&self, invocation: &Invocation) -> Result<CommandOutput, CommandFailure> {
        self.calls.lock().unwrap().push(invocation.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let args: Vec<PathBuf> = invocation.args.iter().map(PathBuf::from).collect();
        let result = match invocation.program.as_str() {
            "pdfseparate" => Ok(self.separate(&args)),
            "pdfunite" => Ok(self.unite(&args).await),
            "gs" => self.optimize(&args),
            other => Err(CommandFailure::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("unknown program {}", other),
            ))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// 写一个 n 页的假文档，第 i 页内容为 `page-i`
pub fn write_source(dir: &Path, pages: u32) -> PathBuf {
    let path = dir.join("source.pdf");
    let content: String = (1..=pages).map(|p| format!("page-{}\n", p)).collect();
    std::fs::write(&path, content).unwrap();
    path
}

/// 输出文件的页（行）列表
pub fn read_pages(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// 目录下的文件名（排序后）
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
