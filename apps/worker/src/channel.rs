//! JSON-lines 命令通道
//!
//! 每行一个命令进，每行一个事件出。同一时刻只服务一个页面。

use chatlog_core::{Event, Submitted, WorkerHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::error::Result;

/// worker 事件流，在先后的连接之间共享
///
/// 每个已排队的命令恰好产生一个结束事件，且事件按命令顺序到达，
/// 因此只需计数就能知道某个事件属于哪个连接。
pub struct EventPump {
    events: UnboundedReceiver<Event>,
    /// 当前连接已提交、结束事件尚未送出的命令数
    pending: usize,
    /// 之前的连接留下的命令数，它们的事件直接丢弃
    orphaned: usize,
}

impl EventPump {
    pub fn new(events: UnboundedReceiver<Event>) -> Self {
        Self {
            events,
            pending: 0,
            orphaned: 0,
        }
    }

    /// 服务一个连接
    ///
    /// 对端关闭输入后继续写出事件，直到这个连接提交的命令全部结束。
    /// 连接中途断开时，剩余命令的事件不会转发给下一个连接。
    pub async fn serve_connection<R, W>(&mut self, reader: R, mut writer: W, handle: &WorkerHandle) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.orphaned += std::mem::take(&mut self.pending);
        if self.orphaned > 0 {
            info!("丢弃上一个连接的 {} 个命令的事件", self.orphaned);
        }

        let mut lines = reader.lines();
        let mut input_open = true;

        loop {
            if !input_open && self.pending == 0 {
                info!("页面已断开");
                return Ok(());
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line? {
                        Some(line) => {
                            if dispatch(&line, handle) {
                                self.pending += 1;
                            }
                        }
                        None => {
                            debug!("页面关闭输入，等待 {} 个命令结束", self.pending);
                            input_open = false;
                        }
                    }
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        info!("worker 已停止，关闭通道");
                        return Ok(());
                    };
                    if self.orphaned > 0 {
                        if event.is_terminal() {
                            self.orphaned -= 1;
                        }
                        debug!("丢弃代号 {} 的遗留事件", event.generation());
                        continue;
                    }
                    if event.is_terminal() {
                        self.pending = self.pending.saturating_sub(1);
                    }
                    let mut encoded = protocol::encode_event(&event)?;
                    encoded.push('\n');
                    writer.write_all(encoded.as_bytes()).await?;
                    writer.flush().await?;
                }
            }
        }
    }
}

/// 解析并提交一行命令，返回是否会产生结束事件；格式错误的命令只记录日志，不回复
fn dispatch(line: &str, handle: &WorkerHandle) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    match protocol::decode_command(line) {
        Ok(command) => {
            debug!("收到命令: {:?}", command);
            let submitted = handle.submit(command);
            if submitted == Submitted::Closed {
                warn!("worker 已停止，命令被丢弃");
            }
            submitted.expects_terminal()
        }
        Err(e) => {
            warn!("忽略无法解析的命令: {}", e);
            false
        }
    }
}
