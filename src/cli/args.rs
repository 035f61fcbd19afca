//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatstream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the AI backend (e.g., http://localhost:5000/api/v1)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the markdown blog posts
    #[arg(long, global = true)]
    pub posts_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask one question and stream the answer to stdout
    Ask {
        /// The question; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Interactive chat session on stdin (`/exit` to leave)
    Chat,
    /// Blog posts
    Blog {
        #[command(subcommand)]
        command: BlogSubcommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum BlogSubcommands {
    /// List posts, newest first
    List {
        /// Only posts in this category (`All` for every category)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive match on title or excerpt
        #[arg(long)]
        search: Option<String>,
    },
    /// Print one rendered post
    Show {
        slug: String,

        /// Print the post as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
    /// Render every post to static HTML with a JSON index
    Build {
        #[arg(long, value_name = "DIR", default_value = "dist")]
        out: PathBuf,
    },
    /// List categories in use
    Categories,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
    /// Save settings to the config file; also takes the global --api-url and --posts-dir
    Set {
        /// Path of the chat endpoint (e.g., /ai-chat/chat)
        #[arg(long)]
        chat_path: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_joins_words_and_reads_timeout() {
        let cli = Cli::parse_from(["chatstream", "ask", "what", "is", "rust", "--timeout", "5"]);
        match cli.command {
            Commands::Ask { prompt, timeout } => {
                assert_eq!(prompt.join(" "), "what is rust");
                assert_eq!(timeout, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_reach_config_set() {
        let cli = Cli::parse_from([
            "chatstream",
            "config",
            "set",
            "--api-url",
            "http://example.test",
            "--chat-path",
            "/chat",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test"));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigSubcommands::Set { chat_path: Some(ref p) }
            } if p == "/chat"
        ));
    }
}
