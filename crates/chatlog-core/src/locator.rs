// chatlog-core/src/locator.rs
//! FileRef → 索引文件位置的转换规则

use serde::{Deserialize, Serialize};

/// 根据文档片段位置给出其搜索索引的位置；没有对应索引时返回 `None`
pub trait IndexLocator: Send + Sync {
    fn index_for(&self, file: &str) -> Option<String>;
}

impl<F> IndexLocator for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn index_for(&self, file: &str) -> Option<String> {
        self(file)
    }
}

/// 目录段与扩展名替换规则
///
/// 各替换一次（首次出现处），例如
/// `split-parts/part-01.html` → `split-parts-search-indexes/part-01.json`。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct IndexPathRule {
    pub fragment_dir: String,
    pub index_dir: String,
    pub fragment_ext: String,
    pub index_ext: String,
}

impl Default for IndexPathRule {
    fn default() -> Self {
        Self {
            fragment_dir: "split-parts".to_string(),
            index_dir: "split-parts-search-indexes".to_string(),
            fragment_ext: ".html".to_string(),
            index_ext: ".json".to_string(),
        }
    }
}

impl IndexLocator for IndexPathRule {
    fn index_for(&self, file: &str) -> Option<String> {
        let rewritten = replace_first(file, &self.fragment_dir, &self.index_dir);
        let rewritten = replace_first(&rewritten, &self.fragment_ext, &self.index_ext);
        // 未命中任何规则时不能把片段本身当作索引去请求
        (rewritten != file).then_some(rewritten)
    }
}

fn replace_first(s: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return s.to_string();
    }
    s.replacen(from, to, 1)
}
