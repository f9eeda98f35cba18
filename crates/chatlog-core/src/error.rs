// chatlog-core/src/error.rs
//! 错误类型

use thiserror::Error;

/// 获取文档片段或索引文件失败。只影响单个文件，不会中断整个批次。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file reference '{0}'")]
    InvalidReference(String),
    #[error("malformed index: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 持久化存储读写失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index store error: {0}")]
    Sled(#[from] sled::Error),
    #[error("index encoding error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("non UTF-8 key in index store")]
    Key(#[from] std::string::FromUtf8Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
