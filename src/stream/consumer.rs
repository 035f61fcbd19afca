use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::Instrument;
use uuid::Uuid;

use super::decoder::Utf8Decoder;
use super::error::StreamError;
use super::request::StreamRequest;
use super::state::StreamState;
use crate::transport::{ChunkReader, Transport};

/// Turns prompts into independently owned, observable streams.
#[derive(Clone)]
pub struct StreamConsumer {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for StreamConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConsumer").finish_non_exhaustive()
    }
}

impl StreamConsumer {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Starts one request for `prompt`.
    ///
    /// Every outcome is reported through the handle's state; a blank prompt
    /// yields a handle that is already in the error state and no request is
    /// made. Must be called within a tokio runtime.
    #[must_use]
    pub fn start(&self, prompt: impl Into<String>) -> StreamHandle {
        let id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let cancel = CancelHandle { tx: cancel_tx };

        let request = match StreamRequest::new(prompt) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(stream_id = %id, "Rejected stream request: {err}");
                let mut state = StreamState::new();
                state.fail(err.user_message());
                let (_state_tx, state_rx) = watch::channel(state);
                return StreamHandle {
                    id,
                    state_rx,
                    cancel,
                    task: None,
                };
            }
        };

        let (state_tx, state_rx) = watch::channel(StreamState::new());
        let span = tracing::info_span!("stream", stream_id = %id);
        let task = tokio::spawn(
            drive(self.transport.clone(), request, state_tx, cancel_rx).instrument(span),
        );

        StreamHandle {
            id,
            state_rx,
            cancel,
            task: Some(task),
        }
    }
}

/// Cloneable cancellation trigger for one stream, for timers and signal
/// handlers that outlive a borrow of the handle.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Live view of one stream plus the means to cancel it.
///
/// Dropping the handle cancels the stream.
#[derive(Debug)]
pub struct StreamHandle {
    id: Uuid,
    state_rx: watch::Receiver<StreamState>,
    cancel: CancelHandle,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state_rx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state_rx.clone()
    }

    /// Every state change as a stream, starting with the current state.
    /// Intermediate states may be coalesced if the reader falls behind.
    #[must_use]
    pub fn updates(&self) -> WatchStream<StreamState> {
        WatchStream::new(self.state_rx.clone())
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Waits for the decode loop to exit and returns the last state.
    pub async fn wait(mut self) -> StreamState {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(stream_id = %self.id, "Stream task ended abnormally: {e}");
            }
        }
        self.state()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

enum Step<T> {
    Cancelled,
    Next(T),
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    // A closed channel means every handle is gone, which counts as cancel.
    let _ = rx.wait_for(|c| *c).await;
}

async fn drive(
    transport: Arc<dyn Transport>,
    request: StreamRequest,
    state_tx: watch::Sender<StreamState>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    state_tx.send_modify(|s| {
        s.begin();
    });

    let opened = tokio::select! {
        biased;
        () = cancelled(&mut cancel_rx) => Step::Cancelled,
        r = transport.open(&request) => Step::Next(r),
    };

    let mut reader = match opened {
        Step::Cancelled => {
            tracing::debug!("Stream cancelled before the response arrived");
            return;
        }
        Step::Next(Ok(reader)) => reader,
        Step::Next(Err(err)) => {
            fail(&state_tx, &err);
            return;
        }
    };

    let mut decoder = Utf8Decoder::new();
    let mut chunks = 0_usize;

    loop {
        let next = tokio::select! {
            biased;
            () = cancelled(&mut cancel_rx) => Step::Cancelled,
            r = reader.next_chunk() => Step::Next(r),
        };

        let next = match next {
            Step::Cancelled => {
                release(reader.as_mut(), chunks);
                return;
            }
            Step::Next(next) => next,
        };

        match next {
            Ok(Some(bytes)) => {
                let mut delta = String::new();
                let decoded = decoder.decode(&bytes, &mut delta);

                if *cancel_rx.borrow() {
                    release(reader.as_mut(), chunks);
                    return;
                }

                chunks += 1;
                tracing::debug!(seq = chunks, bytes = bytes.len(), "Received chunk");

                if !delta.is_empty() {
                    state_tx.send_modify(|s| {
                        s.append(&delta);
                    });
                }

                if let Err(err) = decoded {
                    reader.abort();
                    fail(&state_tx, &err);
                    return;
                }
            }
            Ok(None) => {
                match decoder.finish() {
                    Ok(()) => {
                        state_tx.send_modify(|s| {
                            s.complete();
                        });
                        tracing::info!(
                            chunks,
                            chars = state_tx.borrow().text().chars().count(),
                            "Stream completed"
                        );
                    }
                    Err(err) => fail(&state_tx, &err),
                }
                return;
            }
            Err(err) => {
                reader.abort();
                fail(&state_tx, &err);
                return;
            }
        }
    }
}

fn release(reader: &mut dyn ChunkReader, chunks: usize) {
    tracing::debug!(chunks, "Stream cancelled");
    reader.abort();
}

fn fail(state_tx: &watch::Sender<StreamState>, err: &StreamError) {
    tracing::warn!(error = %err, "Stream failed");
    let message = err.user_message();
    state_tx.send_modify(|s| {
        s.fail(message);
    });
}
