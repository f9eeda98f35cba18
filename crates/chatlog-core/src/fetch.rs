// chatlog-core/src/fetch.rs
//! 资源获取：文档片段与搜索索引
//!
//! - [`HttpFetcher`]：相对引用基于配置的 URL 解析
//! - [`DirFetcher`]：从本地导出目录读取，便于离线浏览

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;
use crate::models::SearchIndex;

const USER_AGENT: &str = concat!("chatlog-worker/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// 读取资源的文本内容；非成功状态码视为失败
    async fn fetch_text(&self, reference: &str) -> Result<String, FetchError>;

    /// 读取并解析一个 JSON 索引文件
    async fn fetch_index(&self, reference: &str) -> Result<SearchIndex, FetchError> {
        let raw = self.fetch_text(reference).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// 通过 HTTP GET 获取资源
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base: as_directory(base),
        })
    }

    fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.base
            .join(reference)
            .map_err(|_| FetchError::InvalidReference(reference.to_string()))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, reference: &str) -> Result<String, FetchError> {
        let url = self.resolve(reference)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// 从本地目录读取资源，引用不能逃出根目录
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(reference.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if reference.is_empty() || escapes {
            return Err(FetchError::InvalidReference(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch_text(&self, reference: &str) -> Result<String, FetchError> {
        let path = self.resolve(reference)?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// 根据配置的来源选择实现：http(s) URL 走网络，其余视为本地目录
pub fn fetcher_for_source(source: &str, timeout: Duration) -> Result<Arc<dyn Fetcher>, FetchError> {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Arc::new(HttpFetcher::new(url, timeout)?)),
        _ => Ok(Arc::new(DirFetcher::new(source))),
    }
}

/// `Url::join` 会替换最后一个路径段，基地址需以 `/` 结尾
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
