// chatlog-core/src/search.rs
//! 搜索模块
//!
//! 纯子串匹配：不分词、不打分、不做词干处理。

use std::collections::{BTreeMap, HashSet};

use protocol::SearchFilter;

use crate::cache::IndexCache;
use crate::models::{FileRef, IndexedMessage, SearchIndex};
use crate::store::IndexStore;

/// 在缓存中搜索，缓存为空时先从存储加载
///
/// 返回去重后的 messageId，顺序无意义。
pub async fn search_cached(
    cache: &mut IndexCache,
    store: &dyn IndexStore,
    term: &str,
    filter: SearchFilter,
) -> Vec<String> {
    let indexes = cache.ensure_loaded(store).await;
    let hits = search_indexes(indexes, term, filter);
    tracing::debug!("[搜索] '{}' ({:?}) 命中 {} 条", term, filter, hits.len());
    hits
}

/// 扫描所有索引的所有消息
pub fn search_indexes(
    indexes: &BTreeMap<FileRef, SearchIndex>,
    term: &str,
    filter: SearchFilter,
) -> Vec<String> {
    let term = term.to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    for message in indexes.values().flatten() {
        if matches(message, &term, filter) && seen.insert(message.message_id.as_str()) {
            hits.push(message.message_id.clone());
        }
    }
    hits
}

/// 作者优先判断，未命中再看内容；结果等同于两者取或
fn matches(message: &IndexedMessage, term: &str, filter: SearchFilter) -> bool {
    if filter.includes_author() && message.author.contains(term) {
        return true;
    }
    filter.includes_content() && message.content.contains(term)
}
