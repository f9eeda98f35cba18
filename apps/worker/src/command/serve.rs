use super::{Command, start_worker};
use crate::channel::EventPump;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use std::fs;
use tokio::io::BufReader;
use tokio::net::UnixListener;
use tracing::{info, warn};

pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let unix_socket_path = self.config.socket_path();

        if let Some(parent) = unix_socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }

        let (handle, events, _task) = start_worker(&self.config)?;
        let mut pump = EventPump::new(events);

        let listener = UnixListener::bind(&unix_socket_path)
            .wrap_err_with(|| format!("Bind {:?} error", unix_socket_path))?;
        info!("监听 {:?}", unix_socket_path);

        // 单页面：一个连接断开后才接受下一个，旧连接的事件不会转发给新连接
        loop {
            let stream = tokio::select! {
                accepted = listener.accept() => accepted?.0,
                _ = tokio::signal::ctrl_c() => {
                    info!("收到中断信号，退出");
                    break;
                }
            };
            info!("页面已连接");

            let (reader, writer) = stream.into_split();
            let served = tokio::select! {
                served = pump.serve_connection(BufReader::new(reader), writer, &handle) => served,
                _ = tokio::signal::ctrl_c() => {
                    info!("收到中断信号，退出");
                    break;
                }
            };
            if let Err(e) = served {
                warn!("连接异常结束: {:#}", e);
            }
        }

        fs::remove_file(&unix_socket_path)?;
        Ok(())
    }
}
