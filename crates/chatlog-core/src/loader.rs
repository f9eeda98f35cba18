// chatlog-core/src/loader.rs
//! 内容加载器
//!
//! 按用户给定的顺序逐个获取文档片段（不并发），每个片段就绪后立即推送给页面，
//! 同时获取其搜索索引写入缓存和持久化存储。单个文件失败不会中断批次。

use std::sync::Arc;

use protocol::Event;
use tokio::sync::mpsc::UnboundedSender;

use crate::cache::IndexCache;
use crate::fetch::Fetcher;
use crate::locator::IndexLocator;
use crate::models::FileRef;
use crate::store::IndexStore;

pub type EventSender = UnboundedSender<Event>;

/// 一次 LOAD_FILES 命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub generation: u64,
    pub files: Vec<FileRef>,
}

/// 批次统计，用于日志
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// 片段获取成功
    pub loaded: usize,
    /// 片段获取失败
    pub failed: usize,
    /// 索引已写入缓存
    pub indexed: usize,
    /// 被更新的批次取代而未处理
    pub skipped: usize,
    /// 持久化失败（索引仍在内存缓存中）
    pub persist_failures: usize,
}

pub struct ContentLoader {
    fetcher: Arc<dyn Fetcher>,
    locator: Arc<dyn IndexLocator>,
}

impl ContentLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, locator: Arc<dyn IndexLocator>) -> Self {
        Self { fetcher, locator }
    }

    /// 处理一个批次
    ///
    /// 开始前清空缓存与存储（整个批次只清一次）。`superseded` 在每个文件之前检查，
    /// 返回 true 时放弃剩余文件，但仍会发送结束事件。
    pub async fn load<S>(
        &self,
        batch: &Batch,
        cache: &mut IndexCache,
        store: &dyn IndexStore,
        events: &EventSender,
        superseded: S,
    ) -> LoadSummary
    where
        S: Fn() -> bool,
    {
        let generation = batch.generation;
        let mut summary = LoadSummary::default();

        cache.clear();
        if let Err(e) = store.clear().await {
            tracing::error!("清空索引存储失败: {}", e);
        }

        for (position, file) in batch.files.iter().enumerate() {
            if superseded() {
                summary.skipped = batch.files.len() - position;
                tracing::info!(
                    "批次 {} 已被取代，跳过剩余 {} 个文件",
                    generation,
                    summary.skipped
                );
                break;
            }

            match self.fetcher.fetch_text(file).await {
                Ok(content) => {
                    summary.loaded += 1;
                    emit(
                        events,
                        Event::FileLoaded {
                            generation,
                            file: file.clone(),
                            content,
                            is_first: position == 0,
                        },
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("加载失败 {}: {}", file, e);
                    emit(
                        events,
                        Event::LoadError {
                            generation,
                            file: file.clone(),
                            error: e.to_string(),
                        },
                    );
                }
            }

            self.load_index(file, cache, store, &mut summary).await;
        }

        emit(events, Event::AllFilesLoaded { generation });
        tracing::info!("批次 {} 完成: {:?}", generation, summary);
        summary
    }

    /// 索引缺失或格式错误只记录日志
    async fn load_index(
        &self,
        file: &str,
        cache: &mut IndexCache,
        store: &dyn IndexStore,
        summary: &mut LoadSummary,
    ) {
        let Some(index_ref) = self.locator.index_for(file) else {
            tracing::debug!("{} 没有对应的索引文件", file);
            return;
        };

        let index = match self.fetcher.fetch_index(&index_ref).await {
            Ok(index) => index,
            Err(e) => {
                tracing::debug!("跳过索引 {}: {}", index_ref, e);
                return;
            }
        };

        if let Err(e) = store.put(file, &index).await {
            summary.persist_failures += 1;
            tracing::error!("保存索引失败 {}: {}", file, e);
        }
        cache.put(file, index);
        summary.indexed += 1;
    }
}

/// 接收端关闭时事件被丢弃
pub(crate) fn emit(events: &EventSender, event: Event) {
    if events.send(event).is_err() {
        tracing::debug!("事件接收端已关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, StoreError, StoreResult};
    use crate::locator::IndexPathRule;
    use crate::models::{IndexedMessage, SearchIndex};
    use crate::store::SledIndexStore;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// 内存中的资源表，同时记录请求顺序
    #[derive(Default)]
    struct MapFetcher {
        resources: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, reference: &str, body: &str) -> Self {
            self.resources.insert(reference.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch_text(&self, reference: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(reference.to_string());
            self.resources
                .get(reference)
                .cloned()
                .ok_or(FetchError::Status(404))
        }
    }

    /// 所有写操作都失败的存储
    struct ReadOnlyStore;

    #[async_trait]
    impl IndexStore for ReadOnlyStore {
        async fn put(&self, _file: &str, _index: &SearchIndex) -> StoreResult<()> {
            Err(StoreError::Sled(sled::Error::Unsupported("read only".into())))
        }

        async fn get(&self, _file: &str) -> StoreResult<Option<SearchIndex>> {
            Ok(None)
        }

        async fn get_all(&self) -> StoreResult<BTreeMap<FileRef, SearchIndex>> {
            Ok(BTreeMap::new())
        }

        async fn clear(&self) -> StoreResult<()> {
            Err(StoreError::Sled(sled::Error::Unsupported("read only".into())))
        }
    }

    fn loader(fetcher: MapFetcher) -> (ContentLoader, Arc<MapFetcher>) {
        let fetcher = Arc::new(fetcher);
        let locator = Arc::new(IndexPathRule::default());
        (ContentLoader::new(fetcher.clone(), locator), fetcher)
    }

    fn batch(generation: u64, files: &[&str]) -> Batch {
        Batch {
            generation,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn archive() -> MapFetcher {
        MapFetcher::default()
            .with("split-parts/a.html", "<body>a</body>")
            .with("split-parts/b.html", "<body>b</body>")
            .with("split-parts/c.html", "<body>c</body>")
            .with(
                "split-parts-search-indexes/a.json",
                r#"[{"messageId":"m1","author":"alice","content":"hello world"},
                    {"messageId":"m2","author":"bob","content":"goodbye"}]"#,
            )
            .with(
                "split-parts-search-indexes/b.json",
                r#"[{"messageId":"m3","author":"alice","content":"hello again"}]"#,
            )
    }

    #[tokio::test]
    async fn test_fragments_stream_in_order() {
        let (loader, _) = loader(archive());
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let files = ["split-parts/a.html", "split-parts/b.html", "split-parts/c.html"];
        let summary = loader
            .load(&batch(1, &files), &mut cache, &store, &tx, || false)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4);
        for (i, file) in files.iter().enumerate() {
            match &events[i] {
                Event::FileLoaded { generation, file: f, is_first, .. } => {
                    assert_eq!(*generation, 1);
                    assert_eq!(f, file);
                    assert_eq!(*is_first, i == 0);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(events[3], Event::AllFilesLoaded { generation: 1 });

        assert_eq!(summary.loaded, 3);
        assert_eq!(summary.indexed, 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fragment_keeps_its_position() {
        let (loader, _) = loader(archive());
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let files = ["split-parts/missing.html", "split-parts/a.html"];
        let summary = loader
            .load(&batch(2, &files), &mut cache, &store, &tx, || false)
            .await;

        let events = drain(&mut rx);
        assert_eq!(
            events[0],
            Event::LoadError {
                generation: 2,
                file: "split-parts/missing.html".into(),
                error: "HTTP error! status: 404".into(),
            }
        );
        // isFirst 按位置分配，第一个文件失败后后续文件也不是 first
        assert!(matches!(&events[1], Event::FileLoaded { is_first: false, .. }));
        assert_eq!(events[2], Event::AllFilesLoaded { generation: 2 });
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.loaded, 1);
    }

    #[tokio::test]
    async fn test_index_fetched_even_when_fragment_fails() {
        let fetcher = MapFetcher::default().with(
            "split-parts-search-indexes/x.json",
            r#"[{"messageId":"m7","author":"eve","content":"orphan"}]"#,
        );
        let (loader, fetcher) = loader(fetcher);
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let summary = loader
            .load(&batch(1, &["split-parts/x.html"]), &mut cache, &store, &tx, || false)
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.indexed, 1);
        assert_eq!(
            *fetcher.requests.lock().unwrap(),
            vec!["split-parts/x.html", "split-parts-search-indexes/x.json"]
        );
        assert_eq!(
            store.get("split-parts/x.html").await.unwrap(),
            Some(vec![IndexedMessage::new("m7", "eve", "orphan")])
        );
    }

    #[tokio::test]
    async fn test_malformed_index_is_skipped_silently() {
        let fetcher = MapFetcher::default()
            .with("split-parts/a.html", "<body>a</body>")
            .with("split-parts-search-indexes/a.json", "<html>not json</html>");
        let (loader, _) = loader(fetcher);
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let summary = loader
            .load(&batch(1, &["split-parts/a.html"]), &mut cache, &store, &tx, || false)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Event::FileLoaded { .. }));
        assert_eq!(summary.indexed, 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_new_batch_replaces_previous_working_set() {
        let (loader, _) = loader(archive());
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        loader
            .load(&batch(1, &["split-parts/a.html"]), &mut cache, &store, &tx, || false)
            .await;
        loader
            .load(&batch(2, &["split-parts/b.html"]), &mut cache, &store, &tx, || false)
            .await;

        let persisted = store.get_all().await.unwrap();
        assert_eq!(persisted.keys().collect::<Vec<_>>(), vec!["split-parts/b.html"]);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_superseded_batch_stops_but_terminates() {
        let (loader, fetcher) = loader(archive());
        let store = SledIndexStore::temporary().unwrap();
        let mut cache = IndexCache::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let checks = Mutex::new(0);
        let superseded = || {
            let mut n = checks.lock().unwrap();
            *n += 1;
            *n > 1
        };
        let files = ["split-parts/a.html", "split-parts/b.html", "split-parts/c.html"];
        let summary = loader
            .load(&batch(5, &files), &mut cache, &store, &tx, superseded)
            .await;

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(fetcher.requests.lock().unwrap().len(), 2);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], Event::AllFilesLoaded { generation: 5 });
    }

    #[tokio::test]
    async fn test_persist_failure_does_not_abort_batch() {
        let (loader, _) = loader(archive());
        let mut cache = IndexCache::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let files = ["split-parts/a.html", "split-parts/b.html"];
        let summary = loader
            .load(&batch(1, &files), &mut cache, &ReadOnlyStore, &tx, || false)
            .await;

        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.persist_failures, 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(drain(&mut rx).len(), 3);
    }
}
