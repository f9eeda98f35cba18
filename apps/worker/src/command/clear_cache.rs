// apps/worker/src/command/clear_cache.rs
//! 清除持久化索引命令

use super::Command;
use crate::config::Config;
use crate::error::Result;
use std::fs;
use std::path::Path;

pub struct ClearCacheCommand {
    config: Config,
}

impl ClearCacheCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 删除目录，返回 (文件数, 字节数)
    fn remove_dir(path: &Path) -> Result<(usize, u64)> {
        if !path.exists() {
            return Ok((0, 0));
        }
        let counted = Self::count_dir_size(path)?;
        fs::remove_dir_all(path)?;
        Ok(counted)
    }

    fn count_dir_size(path: &Path) -> Result<(usize, u64)> {
        let mut file_count = 0;
        let mut total_size = 0u64;

        for entry in fs::read_dir(path)?.flatten() {
            let Ok(metadata) = entry.metadata() else { continue };
            if metadata.is_file() {
                total_size += metadata.len();
                file_count += 1;
            } else if metadata.is_dir() {
                let (sub_count, sub_size) = Self::count_dir_size(&entry.path())?;
                file_count += sub_count;
                total_size += sub_size;
            }
        }

        Ok((file_count, total_size))
    }
}

pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[async_trait::async_trait]
impl Command for ClearCacheCommand {
    async fn execute(&self) -> Result<()> {
        let index_path = self.config.index_store_path();
        println!("🗑️  清除持久化索引: {:?}", index_path);

        match Self::remove_dir(&index_path)? {
            (0, _) => println!("⏭️  目录为空或不存在"),
            (count, size) => println!("✅ 已删除 {} 个文件, {}", count, format_size(size)),
        }
        println!("💡 worker 运行中时请先停止它，下次 LOAD_FILES 会重新下载索引");

        Ok(())
    }
}
