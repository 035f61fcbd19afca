use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, Stdout};
use tokio_stream::StreamExt;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::stream::{StreamConsumer, StreamHandle, StreamState, StreamStatus};

pub async fn run(config: &AppConfig, prompt: &str, timeout: Option<Duration>) -> Result<()> {
    let consumer = StreamConsumer::new(Arc::new(config.transport()?));
    let handle = consumer.start(prompt);

    let state = render(&handle, timeout).await?;
    match state.status() {
        StreamStatus::Done => Ok(()),
        _ => Err(AppError::StreamFailed(
            state.error_message().unwrap_or_default().to_string(),
        )),
    }
}

/// Writes text to stdout as it arrives until the stream settles.
///
/// Ctrl-C and `timeout` cancel the stream; both surface as errors so the
/// partial answer is never mistaken for a complete one.
pub(super) async fn render(handle: &StreamHandle, timeout: Option<Duration>) -> Result<StreamState> {
    let mut stdout = tokio::io::stdout();
    let mut updates = handle.updates();
    let mut printed = 0;

    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let state = loop {
        tokio::select! {
            update = updates.next() => {
                let Some(state) = update else {
                    break handle.state();
                };
                write_delta(&mut stdout, &state, &mut printed).await?;
                if state.is_terminal() {
                    break state;
                }
            }
            _ = &mut ctrl_c => {
                handle.cancel();
                finish_line(&mut stdout, printed).await?;
                return Err(AppError::Cancelled);
            }
            () = &mut deadline => {
                handle.cancel();
                finish_line(&mut stdout, printed).await?;
                let secs = timeout.map_or(0, |t| t.as_secs());
                return Err(AppError::TimedOut(secs));
            }
        }
    };

    finish_line(&mut stdout, printed).await?;
    Ok(state)
}

async fn write_delta(out: &mut Stdout, state: &StreamState, printed: &mut usize) -> Result<()> {
    let text = state.text();
    if let Some(delta) = text.get(*printed..).filter(|d| !d.is_empty()) {
        out.write_all(delta.as_bytes()).await?;
        out.flush().await?;
    }
    *printed = text.len();
    Ok(())
}

async fn finish_line(out: &mut Stdout, printed: usize) -> Result<()> {
    if printed > 0 {
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(())
}
