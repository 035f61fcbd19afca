mod args;
mod ask;
mod blog;
mod chat;
mod config;

pub use args::{BlogSubcommands, Cli, Commands, ConfigSubcommands};

use std::time::Duration;

use crate::config::AppConfig;
use crate::error::Result;

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = AppConfig::load();
    if cli.api_url.is_some() {
        settings.api_url.clone_from(&cli.api_url);
    }
    if cli.posts_dir.is_some() {
        settings.posts_dir.clone_from(&cli.posts_dir);
    }
    tracing::debug!(
        api_url = settings.api_url(),
        chat_path = settings.chat_path(),
        "Loaded config"
    );

    match cli.command {
        Commands::Ask { prompt, timeout } => {
            ask::run(&settings, &prompt.join(" "), timeout.map(Duration::from_secs)).await
        }
        Commands::Chat => chat::run(&settings).await,
        Commands::Blog { command } => blog::run(&settings.posts_dir(), command),
        Commands::Config { command } => config::run(
            command,
            config::SetFlags {
                api_url: cli.api_url,
                posts_dir: cli.posts_dir,
            },
        ),
    }
}
