use super::{Command, start_worker};
use crate::channel::EventPump;
use crate::config::Config;
use crate::error::Result;
use tokio::io::BufReader;

/// 通过标准输入/输出交换命令与事件，适合作为子进程由页面宿主启动
pub struct StdioCommand {
    config: Config,
}

impl StdioCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl Command for StdioCommand {
    async fn execute(&self) -> Result<()> {
        let (handle, events, _task) = start_worker(&self.config)?;
        let stdin = BufReader::new(tokio::io::stdin());
        // 标准输入关闭后仍会等待已提交的命令全部结束
        EventPump::new(events)
            .serve_connection(stdin, tokio::io::stdout(), &handle)
            .await
    }
}
