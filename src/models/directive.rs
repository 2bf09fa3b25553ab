//! 页指令与规格表
//!
//! 规格表的每一行对应一个 `PageDirective`：源文档的某一页、重复次数、可选标题

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::OnceLock;

/// 单行页指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDirective {
    /// 源文档页码（从 1 开始）
    pub page: u32,
    /// 重复次数（≥ 1）
    pub repeats: u32,
    /// 输出标题（已规范化，非空）
    pub title: Option<String>,
}

impl PageDirective {
    /// 创建页指令，标题会被规范化，空标题视为无标题
    pub fn new(page: u32, repeats: u32, title: Option<&str>) -> Self {
        Self {
            page,
            repeats,
            title: title.and_then(normalize_title),
        }
    }

    /// 输出文件名：有标题用标题，否则用 4 位补零页码
    pub fn output_filename(&self) -> String {
        match &self.title {
            Some(title) => format!("{}.pdf", title),
            None => format!("{:04}.pdf", self.page),
        }
    }
}

impl Display for PageDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "页 {} ×{}", self.page, self.repeats)?;
        if let Some(title) = &self.title {
            write!(f, " ({})", title)?;
        }
        Ok(())
    }
}

/// 标题规范化：连续空白折叠为一个空格并去掉首尾空白
pub fn normalize_title(raw: &str) -> Option<String> {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("静态正则"));
    let normalized = re.replace_all(raw.trim(), " ").into_owned();
    (!normalized.is_empty()).then_some(normalized)
}

/// 规格表：有序的页指令序列，构建后只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecTable {
    directives: Vec<PageDirective>,
}

impl SpecTable {
    pub fn new(directives: Vec<PageDirective>) -> Self {
        Self { directives }
    }

    pub fn directives(&self) -> &[PageDirective] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// 按页码稳定升序排列，只影响日志和启动顺序
    pub fn sorted_by_page(&self) -> Vec<PageDirective> {
        let mut sorted = self.directives.clone();
        sorted.sort_by_key(|d| d.page);
        sorted
    }

    /// 每条指令及其输出文件名
    pub fn output_plan(&self) -> Vec<(&PageDirective, String)> {
        self.directives
            .iter()
            .map(|d| (d, d.output_filename()))
            .collect()
    }

    /// 会产生相同输出文件名的指令组（后写入者覆盖先写入者）
    pub fn duplicate_output_names(&self) -> Vec<(String, Vec<&PageDirective>)> {
        let mut groups: HashMap<String, Vec<&PageDirective>> = HashMap::new();
        let mut order = Vec::new();
        for (directive, name) in self.output_plan() {
            let entry = groups.entry(name.clone()).or_default();
            if entry.is_empty() {
                order.push(name);
            }
            entry.push(directive);
        }

        order
            .into_iter()
            .filter_map(|name| {
                let group = groups.remove(&name)?;
                (group.len() > 1).then_some((name, group))
            })
            .collect()
    }
}

impl FromIterator<PageDirective> for SpecTable {
    fn from_iter<I: IntoIterator<Item = PageDirective>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
