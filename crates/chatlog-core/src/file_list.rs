// chatlog-core/src/file_list.rs
//! `file_list.txt` 清单解析

use crate::models::FileRef;

/// 每行一个 FileRef，忽略空白行
pub fn parse_file_list(raw: &str) -> Vec<FileRef> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 用于展示的名称：最后一个路径段去掉最后一个扩展名
pub fn display_name(file: &str) -> &str {
    let without_query = file.split(['?', '#']).next().unwrap_or(file);
    let base = without_query.rsplit('/').next().unwrap_or(without_query);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}
