mod channel;
mod cli;
mod command;
mod config;
mod error;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing::Level;

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();

    // stdout 留给 stdio 通道，日志统一写 stderr
    let level = match command_line.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::Config::load()
        .context("Load configuration error")?
        .with_source(command_line.source);

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Serve => Box::new(command::ServeCommand::new(cfg)),
            cli::Commands::Stdio => Box::new(command::StdioCommand::new(cfg)),
            cli::Commands::FileList => Box::new(command::FileListCommand::new(cfg)),
            cli::Commands::ClearCache => Box::new(command::ClearCacheCommand::new(cfg)),
            cli::Commands::DebugCache { filter, limit } => {
                Box::new(command::DebugCacheCommand::new(cfg, filter, limit))
            }
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
