use std::path::PathBuf;

use super::args::ConfigSubcommands;
use crate::config::{AppConfig, ConfigPatch, ConfigPersister};
use crate::error::Result;

/// Global flags that double as values for `config set`.
pub struct SetFlags {
    pub api_url: Option<String>,
    pub posts_dir: Option<PathBuf>,
}

pub fn run(command: ConfigSubcommands, flags: SetFlags) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = AppConfig::init_default()?;
            println!("✓ Created config file at {}", path.display());
        }
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("✗ Could not determine config path"),
        },
        ConfigSubcommands::Set { chat_path } => {
            let patch = ConfigPatch {
                api_url: flags.api_url,
                chat_path,
                posts_dir: flags.posts_dir,
            };
            if patch.is_empty() {
                println!("Nothing to set; pass --api-url, --chat-path or --posts-dir");
                return Ok(());
            }

            let persister = ConfigPersister::with_default_path()?;
            persister.apply_patch(&patch)?;
            println!("✓ Updated {}", persister.path().display());
        }
    }
    Ok(())
}
