use crate::error::SpecError;
use crate::models::directive::{PageDirective, SpecTable};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// 规格表的列名配置
#[derive(Debug, Clone)]
pub struct SpecColumns {
    pub page_no: String,
    pub repeats: String,
    pub title: Option<String>,
}

impl Default for SpecColumns {
    fn default() -> Self {
        Self {
            page_no: "page_no".to_string(),
            repeats: "repeats".to_string(),
            title: None,
        }
    }
}

/// 从 TSV 文件加载规格表
pub fn load_spec_table(path: &Path, columns: &SpecColumns) -> Result<SpecTable, SpecError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    parse_spec_table(file, columns)
}

/// 解析带表头的制表符分隔记录流
///
/// 标题列在表头中不存在时，所有指令都按页码命名
pub fn parse_spec_table<R: Read>(reader: R, columns: &SpecColumns) -> Result<SpecTable, SpecError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let page_idx = find(&columns.page_no).ok_or_else(|| SpecError::MissingColumn {
        column: columns.page_no.clone(),
    })?;
    let repeats_idx = find(&columns.repeats).ok_or_else(|| SpecError::MissingColumn {
        column: columns.repeats.clone(),
    })?;
    let title_idx = columns.title.as_deref().and_then(find);

    let mut directives = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let field = |idx: usize, column: &str| {
            record.get(idx).ok_or_else(|| SpecError::MalformedRecord {
                line,
                column: column.to_string(),
                value: String::new(),
                reason: "字段缺失".to_string(),
            })
        };

        let page_raw = field(page_idx, &columns.page_no)?;
        let page = parse_page_number(page_raw).ok_or_else(|| SpecError::MalformedRecord {
            line,
            column: columns.page_no.clone(),
            value: page_raw.to_string(),
            reason: "页码必须是正整数".to_string(),
        })?;

        let repeats_raw = field(repeats_idx, &columns.repeats)?;
        let repeats = repeats_raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| SpecError::MalformedRecord {
                line,
                column: columns.repeats.clone(),
                value: repeats_raw.to_string(),
                reason: "重复次数必须是正整数".to_string(),
            })?;

        let title = title_idx.and_then(|idx| record.get(idx));
        directives.push(PageDirective::new(page, repeats, title));
    }

    Ok(SpecTable::new(directives))
}

/// 解析页码，允许非数字前缀（如 `p12`）
fn parse_page_number(raw: &str) -> Option<u32> {
    static PAGE_NO: OnceLock<Regex> = OnceLock::new();
    let re = PAGE_NO.get_or_init(|| Regex::new(r"^[^0-9+\-]*([0-9]+)$").expect("静态正则"));
    let caps = re.captures(raw.trim())?;
    caps[1].parse::<u32>().ok().filter(|&n| n >= 1)
}
