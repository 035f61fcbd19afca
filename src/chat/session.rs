use super::history::{ChatHistory, ChatMessage};
use crate::stream::{CancelHandle, StreamConsumer, StreamHandle, StreamState, StreamStatus};

/// A conversation with at most one live stream.
///
/// The history belongs to the session, not to the streams: a reply is only
/// recorded once its stream has finished successfully.
#[derive(Debug)]
pub struct ChatSession {
    consumer: StreamConsumer,
    history: ChatHistory,
    in_flight: Option<CancelHandle>,
}

impl ChatSession {
    #[must_use]
    pub fn new(consumer: StreamConsumer) -> Self {
        Self::with_history(consumer, ChatHistory::with_greeting())
    }

    #[must_use]
    pub const fn with_history(consumer: StreamConsumer, history: ChatHistory) -> Self {
        Self {
            consumer,
            history,
            in_flight: None,
        }
    }

    #[must_use]
    pub const fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Sends `prompt`, cancelling whatever stream this session started before.
    ///
    /// A blank prompt leaves the history untouched and returns a handle that
    /// is already in the error state.
    pub fn ask(&mut self, prompt: &str) -> StreamHandle {
        if prompt.trim().is_empty() {
            return self.consumer.start(prompt);
        }

        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.history.push(ChatMessage::user(prompt));
        let handle = self.consumer.start(prompt);
        self.in_flight = Some(handle.cancel_handle());
        handle
    }

    /// Records the outcome of a stream started by [`ask`](Self::ask).
    ///
    /// Returns `true` if an assistant message was added.
    pub fn settle(&mut self, state: &StreamState) -> bool {
        if state.is_terminal() {
            self.in_flight = None;
        }
        if state.status() != StreamStatus::Done {
            return false;
        }
        self.history.push(ChatMessage::assistant(state.text()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use crate::stream::StreamError;
    use crate::transport::{MockResponse, MockTransport};
    use std::sync::Arc;

    fn session(transport: &MockTransport) -> ChatSession {
        ChatSession::new(StreamConsumer::new(Arc::new(transport.clone())))
    }

    #[tokio::test]
    async fn successful_exchange_is_recorded() {
        let transport =
            MockTransport::new().with_response(MockResponse::chunks(["Photo", "synthesis"]));
        let mut session = session(&transport);

        let state = session.ask("How do plants eat?").wait().await;
        assert!(session.settle(&state));

        let messages = session.history().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("How do plants eat?"));
        assert_eq!(messages[2], ChatMessage::assistant("Photosynthesis"));
    }

    #[tokio::test]
    async fn failed_exchange_records_only_the_question() {
        let transport = MockTransport::new()
            .with_response(MockResponse::reject(StreamError::server(500, "down")));
        let mut session = session(&transport);

        let state = session.ask("Anyone there?").wait().await;
        assert!(!session.settle(&state));

        let last = session.history().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn blank_prompt_does_not_touch_history() {
        let transport = MockTransport::new();
        let mut session = session(&transport);

        let state = session.ask("  ").wait().await;
        assert_eq!(state.error_message(), Some("prompt required"));
        assert!(!session.settle(&state));
        assert_eq!(session.history().len(), 1);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn new_question_cancels_previous_stream() {
        let (slow, _feed) = MockResponse::fed();
        let transport = MockTransport::new()
            .with_response(slow)
            .with_response(MockResponse::text("fast"));
        let mut session = session(&transport);

        let first = session.ask("slow one");
        while transport.request_count() == 0 {
            tokio::task::yield_now().await;
        }
        let second = session.ask("fast one");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        let first_state = first.wait().await;
        assert_eq!(first_state.status(), StreamStatus::Streaming);
        assert!(!session.settle(&first_state));

        let second_state = second.wait().await;
        assert!(session.settle(&second_state));
        assert_eq!(session.history().last().unwrap().content, "fast");
    }
}
