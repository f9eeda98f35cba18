// chatlog-core/src/models.rs
//! 数据模型定义

use serde::{Deserialize, Serialize};

/// 文档片段标识（路径或 URL），同时决定其搜索索引的位置
pub type FileRef = String;

/// 单个文件的搜索索引，保持预构建文件中的消息顺序
pub type SearchIndex = Vec<IndexedMessage>;

/// 可搜索的单条消息
///
/// `author` 与 `content` 在预构建索引中已是小写，这里只读不改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedMessage {
    pub message_id: String,
    pub author: String,
    pub content: String,
}

impl IndexedMessage {
    pub fn new(message_id: impl Into<String>, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            author: author.into(),
            content: content.into(),
        }
    }
}
