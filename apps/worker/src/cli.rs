use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL or directory the archive is served from (overrides the config file)
    #[arg(short, long, global = true)]
    pub source: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the command channel on a unix socket
    Serve,
    /// Speak the command channel over stdin/stdout
    Stdio,
    /// List the files named by the archive's file list
    FileList,
    /// Remove the persisted search indexes
    ClearCache,
    /// Show the persisted search indexes
    DebugCache {
        /// Only show files whose reference contains this text
        filter: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}
