use anyhow::Result;
use clap::Parser;

use aptarb::application::{Cli, CommandExecutor};
use aptarb::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load_or_default(),
    };

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
