// chatlog-core/src/worker.rs
//! 后台 worker
//!
//! 单个任务按顺序执行命令，缓存与存储只归它所有，因此搜索只会看到加载前或
//! 加载完成后的状态。命令在提交时分配代号，正在执行的旧批次据此提前结束。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use protocol::{Command, Event, SearchFilter};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::cache::IndexCache;
use crate::loader::{Batch, ContentLoader, EventSender, emit};
use crate::search::search_cached;
use crate::store::IndexStore;

/// 已接受、等待执行的命令
#[derive(Debug)]
enum Job {
    Load(Batch),
    Search {
        generation: u64,
        term: String,
        filter: SearchFilter,
    },
}

/// [`WorkerHandle::submit`] 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// 已排队，之后恰好会有一个结束事件
    Queued { generation: u64 },
    /// 未知命令，不产生任何事件
    Ignored,
    /// worker 已退出
    Closed,
}

impl Submitted {
    /// 是否欠页面一个结束事件
    pub fn expects_terminal(self) -> bool {
        matches!(self, Submitted::Queued { .. })
    }
}

/// 页面一侧持有的句柄，可以克隆
#[derive(Clone)]
pub struct WorkerHandle {
    jobs: UnboundedSender<Job>,
    latest_generation: Arc<AtomicU64>,
}

impl WorkerHandle {
    /// 提交一条命令；未知命令直接丢弃
    pub fn submit(&self, command: Command) -> Submitted {
        let job = match command {
            Command::LoadFiles { files } => {
                let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
                Job::Load(Batch { generation, files })
            }
            Command::SearchFiles {
                search_term,
                search_filter,
            } => Job::Search {
                generation: self.latest_generation.load(Ordering::SeqCst),
                term: search_term,
                filter: search_filter,
            },
            Command::Unknown => {
                tracing::debug!("忽略未知命令");
                return Submitted::Ignored;
            }
        };
        let generation = match &job {
            Job::Load(batch) => batch.generation,
            Job::Search { generation, .. } => *generation,
        };
        match self.jobs.send(job) {
            Ok(()) => Submitted::Queued { generation },
            Err(_) => Submitted::Closed,
        }
    }

    /// 最近一次 LOAD_FILES 的代号，尚未加载过时为 0
    pub fn latest_generation(&self) -> u64 {
        self.latest_generation.load(Ordering::SeqCst)
    }
}

pub struct Worker {
    cache: IndexCache,
    store: Arc<dyn IndexStore>,
    loader: ContentLoader,
}

impl Worker {
    pub fn new(store: Arc<dyn IndexStore>, loader: ContentLoader) -> Self {
        Self {
            cache: IndexCache::new(),
            store,
            loader,
        }
    }

    /// 启动后台任务，返回命令句柄、事件流和任务句柄
    ///
    /// 所有 [`WorkerHandle`] 被丢弃后任务结束。
    pub fn spawn(self) -> (WorkerHandle, UnboundedReceiver<Event>, JoinHandle<()>) {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let latest_generation = Arc::new(AtomicU64::new(0));

        let handle = WorkerHandle {
            jobs: jobs_tx,
            latest_generation: latest_generation.clone(),
        };
        let task = tokio::spawn(self.run(jobs_rx, events_tx, latest_generation));
        (handle, events_rx, task)
    }

    async fn run(
        mut self,
        mut jobs: UnboundedReceiver<Job>,
        events: EventSender,
        latest_generation: Arc<AtomicU64>,
    ) {
        tracing::info!("worker 已启动");
        while let Some(job) = jobs.recv().await {
            match job {
                Job::Load(batch) => {
                    tracing::info!("加载批次 {}: {} 个文件", batch.generation, batch.files.len());
                    let generation = batch.generation;
                    let latest = latest_generation.clone();
                    self.loader
                        .load(
                            &batch,
                            &mut self.cache,
                            self.store.as_ref(),
                            &events,
                            move || latest.load(Ordering::SeqCst) != generation,
                        )
                        .await;
                }
                Job::Search {
                    generation,
                    term,
                    filter,
                } => {
                    let matching_message_ids =
                        search_cached(&mut self.cache, self.store.as_ref(), &term, filter).await;
                    emit(
                        &events,
                        Event::SearchComplete {
                            generation,
                            matching_message_ids,
                        },
                    );
                }
            }
        }
        tracing::info!("worker 已停止");
    }
}
