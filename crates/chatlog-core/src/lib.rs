// chatlog-core/src/lib.rs
//! 分卷聊天记录的后台加载、索引缓存与搜索
//!
//! - 按顺序流式加载文档片段
//! - 搜索索引持久化（sled），重启后无需重新下载
//! - 按作者/内容过滤的子串搜索
//! - 单任务 worker 串行执行加载与搜索

pub mod cache;
pub mod error;
pub mod fetch;
pub mod file_list;
pub mod loader;
pub mod locator;
pub mod models;
pub mod search;
pub mod store;
pub mod worker;

// 重导出核心类型
pub use cache::IndexCache;
pub use error::{FetchError, StoreError};
pub use fetch::{DirFetcher, Fetcher, HttpFetcher, fetcher_for_source};
pub use file_list::{display_name, parse_file_list};
pub use loader::{Batch, ContentLoader, EventSender, LoadSummary};
pub use locator::{IndexLocator, IndexPathRule};
pub use models::{FileRef, IndexedMessage, SearchIndex};
pub use protocol::{Command, Event, SearchFilter};
pub use search::{search_cached, search_indexes};
pub use store::{IndexStore, SledIndexStore};
pub use worker::{Submitted, Worker, WorkerHandle};
