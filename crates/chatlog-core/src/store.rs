// chatlog-core/src/store.rs
//! 持久化索引存储
//! 使用 sled 按文件保存搜索索引，进程重启后无需重新下载

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use sled::Db;

use crate::error::StoreResult;
use crate::models::{FileRef, SearchIndex};

/// 以 FileRef 为键的持久化索引存储
///
/// `put` 和 `clear` 返回时数据必须已经落盘。
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn put(&self, file: &str, index: &SearchIndex) -> StoreResult<()>;

    async fn get(&self, file: &str) -> StoreResult<Option<SearchIndex>>;

    async fn get_all(&self) -> StoreResult<BTreeMap<FileRef, SearchIndex>>;

    async fn clear(&self) -> StoreResult<()>;
}

/// sled 实现
pub struct SledIndexStore {
    db: Db,
}

impl SledIndexStore {
    /// 创建或打开索引数据库
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = sled::open(path)?;
        tracing::info!("索引存储已打开: {:?}", path);
        Ok(Self { db })
    }

    /// 仅存在于内存中的数据库，随进程退出删除
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// 获取存储统计信息：(条目数, 磁盘占用字节)
    pub fn stats(&self) -> (usize, u64) {
        let count = self.db.len();
        let size = self.db.size_on_disk().unwrap_or(0);
        (count, size)
    }

    /// 所有已保存的文件及其消息数
    pub fn entries(&self) -> StoreResult<Vec<(FileRef, usize)>> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (key, value) = item?;
            let index: SearchIndex = bincode::deserialize(&value)?;
            entries.push((String::from_utf8(key.to_vec())?, index.len()));
        }
        Ok(entries)
    }
}

#[async_trait]
impl IndexStore for SledIndexStore {
    async fn put(&self, file: &str, index: &SearchIndex) -> StoreResult<()> {
        let data = bincode::serialize(index)?;
        self.db.insert(file.as_bytes(), data)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn get(&self, file: &str) -> StoreResult<Option<SearchIndex>> {
        match self.db.get(file.as_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> StoreResult<BTreeMap<FileRef, SearchIndex>> {
        let mut all = BTreeMap::new();
        for item in self.db.iter() {
            let (key, value) = item?;
            let index: SearchIndex = bincode::deserialize(&value)?;
            all.insert(String::from_utf8(key.to_vec())?, index);
        }
        Ok(all)
    }

    async fn clear(&self) -> StoreResult<()> {
        self.db.clear()?;
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexedMessage;

    fn sample() -> SearchIndex {
        vec![
            IndexedMessage::new("m1", "alice", "hello world"),
            IndexedMessage::new("m2", "bob", "goodbye"),
        ]
    }

    #[tokio::test]
    async fn test_put_get_and_clear() {
        let store = SledIndexStore::temporary().unwrap();
        store.put("a.html", &sample()).await.unwrap();

        assert_eq!(store.get("a.html").await.unwrap(), Some(sample()));
        assert_eq!(store.get("missing.html").await.unwrap(), None);
        assert_eq!(store.stats().0, 1);

        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexes");

        {
            let store = SledIndexStore::open(&path).unwrap();
            store.put("a.html", &sample()).await.unwrap();
            store.put("b.html", &vec![IndexedMessage::new("m3", "alice", "hello again")]).await.unwrap();
        }

        let reopened = SledIndexStore::open(&path).unwrap();
        let all = reopened.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a.html"], sample());
        assert_eq!(
            reopened.entries().unwrap(),
            vec![("a.html".to_string(), 2), ("b.html".to_string(), 1)]
        );
    }
}
