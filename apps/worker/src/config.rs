use crate::error::Result;
use chatlog_core::{Fetcher, IndexPathRule, SledIndexStore, fetcher_for_source};
use config::{AppStrategy, create_strategy, resolve_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    pub runtime_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// 文档片段所在的基地址（http/https URL）或本地目录
    pub source: String,
    pub fetch_timeout_secs: u64,
    pub index_rule: IndexPathRule,
}

fn default_config() -> Config {
    let (runtime_dir, cache_dir) = match create_strategy() {
        Ok(strategy) => (
            resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir()),
            resolve_dir("CACHE_DIRECTORY", &strategy, |s| Some(s.cache_dir())),
        ),
        Err(_) => {
            let fallback = std::env::temp_dir().join(config::constants::APP_NAME);
            (fallback.clone(), fallback)
        }
    };

    Config {
        runtime_dir,
        cache_dir,
        source: "http://localhost:8000/".to_string(),
        fetch_timeout_secs: 30,
        index_rule: IndexPathRule::default(),
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;
        let config_path = strategy.config_dir().join(config::constants::WORKER_CONFIG_FILE_NAME);

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 配置文件不存在，创建示例配置文件
                Self::create_example_config(&config_path)?;
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        if let Some(source) = source {
            self.source = source;
        }
        self
    }

    pub fn index_store_path(&self) -> PathBuf {
        config::index_store_path(&self.cache_dir)
    }

    pub fn socket_path(&self) -> PathBuf {
        config::socket_path(&self.runtime_dir)
    }

    pub fn open_store(&self) -> Result<SledIndexStore> {
        let path = self.index_store_path();
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(SledIndexStore::open(&path)?)
    }

    pub fn fetcher(&self) -> Result<Arc<dyn Fetcher>> {
        let timeout = Duration::from_secs(self.fetch_timeout_secs);
        Ok(fetcher_for_source(&self.source, timeout)?)
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        use std::io::Write;

        // 确保配置目录存在
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = r#"# Worker 配置文件
#
# 此文件在首次运行时自动创建
# 配置修改后重启 worker 生效

# 文档片段所在位置：http(s) 基地址或本地导出目录
source = "http://localhost:8000/"

# 单个请求超时（秒）
fetch-timeout-secs = 30

# 片段路径 -> 索引路径的替换规则
[index-rule]
fragment-dir = "split-parts"
index-dir = "split-parts-search-indexes"
fragment-ext = ".html"
index-ext = ".json"

# 可选：自定义运行时目录（unix socket 所在位置）
# runtime-dir = "/custom/runtime/path"

# 可选：自定义缓存目录（持久化索引所在位置）
# cache-dir = "/custom/cache/path"
"#;

        let mut file = std::fs::File::create(config_path)?;
        file.write_all(example_config.as_bytes())?;

        eprintln!("\n📝 已创建配置文件: {:?}", config_path);
        eprintln!("💡 请编辑配置文件，把 source 指向导出的聊天记录\n");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::load_str("").unwrap();
        assert_eq!(cfg.fetch_timeout_secs, 30);
        assert_eq!(cfg.index_rule, IndexPathRule::default());
    }

    #[test]
    fn test_partial_config() {
        let cfg = Config::load_str(
            r#"
source = "/srv/chat-export"
cache-dir = "/tmp/chatlog-cache"

[index-rule]
index-dir = "indexes"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source, "/srv/chat-export");
        assert_eq!(cfg.index_store_path(), PathBuf::from("/tmp/chatlog-cache/search-indexes"));
        assert_eq!(cfg.index_rule.index_dir, "indexes");
        assert_eq!(cfg.index_rule.fragment_ext, ".html");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::load_str("watch-paths = []").is_err());
    }

    #[test]
    fn test_cli_source_overrides() {
        let cfg = Config::default().with_source(Some("https://example.org/log/".into()));
        assert_eq!(cfg.source, "https://example.org/log/");
        let cfg = cfg.with_source(None);
        assert_eq!(cfg.source, "https://example.org/log/");
    }

    #[test]
    fn test_example_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("worker.toml");
        Config::create_example_config(&path).unwrap();
        let cfg = Config::load_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cfg.source, "http://localhost:8000/");
    }
}
