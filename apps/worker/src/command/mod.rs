pub mod clear_cache;
pub mod debug_cache;
pub mod file_list;
pub mod serve;
pub mod stdio;

use crate::config::Config;
use crate::error::Result;
use chatlog_core::{ContentLoader, Event, Worker, WorkerHandle};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

pub use clear_cache::ClearCacheCommand;
pub use debug_cache::DebugCacheCommand;
pub use file_list::FileListCommand;
pub use serve::ServeCommand;
pub use stdio::StdioCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// 按配置打开存储、选择资源来源并启动后台 worker
fn start_worker(config: &Config) -> Result<(WorkerHandle, UnboundedReceiver<Event>, JoinHandle<()>)> {
    let store = Arc::new(config.open_store()?);
    let loader = ContentLoader::new(config.fetcher()?, Arc::new(config.index_rule.clone()));
    tracing::info!("资源来源: {}", config.source);
    Ok(Worker::new(store, loader).spawn())
}
