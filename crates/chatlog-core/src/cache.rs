// chatlog-core/src/cache.rs
//! 内存索引缓存
//! 搜索的快速路径；为空时从持久化存储整体加载

use std::collections::BTreeMap;

use crate::models::{FileRef, SearchIndex};
use crate::store::IndexStore;

/// FileRef → SearchIndex 的内存映射，由 worker 持有
#[derive(Debug, Default)]
pub struct IndexCache {
    indexes: BTreeMap<FileRef, SearchIndex>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回缓存内容；缓存为空时先从存储读取全部索引
    ///
    /// 非空缓存不会与存储对账，需要刷新时先调用 [`IndexCache::clear`]。
    /// 读取存储失败时记录日志并保持为空。
    pub async fn ensure_loaded(&mut self, store: &dyn IndexStore) -> &BTreeMap<FileRef, SearchIndex> {
        if self.indexes.is_empty() {
            match store.get_all().await {
                Ok(indexes) => {
                    tracing::debug!("从持久化存储加载了 {} 个索引", indexes.len());
                    self.indexes = indexes;
                }
                Err(e) => tracing::error!("Failed to load indexes from store: {}", e),
            }
        }
        &self.indexes
    }

    pub fn put(&mut self, file: impl Into<FileRef>, index: SearchIndex) {
        self.indexes.insert(file.into(), index);
    }

    /// 只清空内存；持久化存储由加载器在批次开始时清空
    pub fn clear(&mut self) {
        self.indexes.clear();
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
