use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::ask::render;
use crate::chat::ChatSession;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::stream::{StreamConsumer, StreamStatus};

const EXIT_COMMANDS: [&str; 2] = ["/exit", "/quit"];

pub async fn run(config: &AppConfig) -> Result<()> {
    let consumer = StreamConsumer::new(Arc::new(config.transport()?));
    let mut session = ChatSession::new(consumer);

    let mut stdout = tokio::io::stdout();
    if let Some(greeting) = session.history().last() {
        stdout
            .write_all(format!("{}\n", greeting.content).as_bytes())
            .await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&prompt) {
            break;
        }

        let handle = session.ask(prompt);
        match render(&handle, None).await {
            Ok(state) => {
                session.settle(&state);
                if state.status() == StreamStatus::Error {
                    eprintln!("✗ {}", state.error_message().unwrap_or_default());
                }
            }
            Err(AppError::Cancelled) => eprintln!("(cancelled)"),
            Err(e) => return Err(e),
        }
    }

    tracing::debug!(messages = session.history().len(), "Chat session ended");
    Ok(())
}
