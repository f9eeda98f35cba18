pub const TOP_LEVEL_DOMAIN: &str = "org";
pub const AUTHOR: &str = "chatlog";
pub const APP_NAME: &str = "chatlog-worker";

pub const WORKER_CONFIG_FILE_NAME: &str = "worker.toml";
pub const UNIX_SOCKET_FILE_NAME: &str = "worker.sock";
pub const INDEX_STORE_DIR_NAME: &str = "search-indexes";
pub const FILE_LIST_NAME: &str = "file_list.txt";
