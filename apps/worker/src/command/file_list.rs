// apps/worker/src/command/file_list.rs
//! 列出归档清单中的文件

use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use chatlog_core::{display_name, parse_file_list};

pub struct FileListCommand {
    config: Config,
}

impl FileListCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Command for FileListCommand {
    async fn execute(&self) -> Result<()> {
        let fetcher = self.config.fetcher()?;
        let raw = fetcher
            .fetch_text(config::constants::FILE_LIST_NAME)
            .await
            .wrap_err_with(|| format!("Fetch {} from {}", config::constants::FILE_LIST_NAME, self.config.source))?;

        for file in parse_file_list(&raw) {
            println!("{}\t{}", display_name(&file), file);
        }
        Ok(())
    }
}
