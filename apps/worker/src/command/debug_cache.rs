// apps/worker/src/command/debug_cache.rs
//! 调试缓存命令 - 查看已持久化的搜索索引

use super::Command;
use super::clear_cache::format_size;
use crate::config::Config;
use crate::error::Result;

pub struct DebugCacheCommand {
    config: Config,
    filter: Option<String>,
    limit: usize,
}

impl DebugCacheCommand {
    pub fn new(config: Config, filter: Option<String>, limit: usize) -> Self {
        Self { config, filter, limit }
    }
}

#[async_trait::async_trait]
impl Command for DebugCacheCommand {
    async fn execute(&self) -> Result<()> {
        let index_path = self.config.index_store_path();

        println!("🔍 持久化索引调试工具");
        println!("📂 存储目录: {:?}", index_path);
        if let Some(ref filter) = self.filter {
            println!("🔎 过滤条件: {}", filter);
        }
        println!();

        if !index_path.exists() {
            println!("❌ 存储不存在，请先发送一次 LOAD_FILES");
            return Ok(());
        }

        // 正在运行的 worker 持有数据库锁
        let store = match self.config.open_store() {
            Ok(store) => store,
            Err(e) => {
                println!("⚠️  无法打开索引存储: {:#}", e);
                println!("💡 提示: 数据库可能被正在运行的 worker 锁定，请先停止它。");
                return Ok(());
            }
        };

        let (count, size) = store.stats();
        let mut shown = 0;
        let mut matched = 0;
        let mut messages = 0;

        for (file, len) in store.entries()? {
            if let Some(ref filter) = self.filter {
                if !file.contains(filter.as_str()) {
                    continue;
                }
            }
            matched += 1;
            messages += len;
            if shown < self.limit {
                println!("📄 {} ({}): {} 条消息", file, chatlog_core::display_name(&file), len);
                shown += 1;
            }
        }

        println!();
        println!("📊 共 {} 个文件 ({} 个匹配，{} 条消息)，占用 {}", count, matched, messages, format_size(size));
        if matched > shown {
            println!("   仅显示前 {} 个，使用 --limit 查看更多", shown);
        }
        Ok(())
    }
}
