use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::{ChunkReader, Transport};
use crate::stream::{StreamError, StreamRequest};

type BodyItem = Result<Bytes, StreamError>;

/// One scripted answer of a [`MockTransport`].
#[derive(Debug)]
pub enum MockResponse {
    /// Body delivered item by item; an `Err` item fails the read at that point.
    Body(Vec<BodyItem>),
    /// Body fed from a [`MockFeed`] as the test goes.
    Fed(mpsc::UnboundedReceiver<BodyItem>),
    /// The request itself fails.
    Reject(StreamError),
}

impl MockResponse {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Body(vec![Ok(Bytes::from(text.into()))])
    }

    #[must_use]
    pub fn chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::Body(chunks.into_iter().map(|c| Ok(c.into())).collect())
    }

    #[must_use]
    pub fn chunks_then_error<I, B>(chunks: I, error: StreamError) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let mut body: Vec<BodyItem> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        body.push(Err(error));
        Self::Body(body)
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::Body(Vec::new())
    }

    #[must_use]
    pub const fn reject(error: StreamError) -> Self {
        Self::Reject(error)
    }

    /// A body whose chunks are pushed through the returned feed.
    #[must_use]
    pub fn fed() -> (Self, MockFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Fed(rx), MockFeed { tx })
    }
}

/// Sending half of a [`MockResponse::Fed`] body. Dropping it ends the body.
#[derive(Debug, Clone)]
pub struct MockFeed {
    tx: mpsc::UnboundedSender<BodyItem>,
}

impl MockFeed {
    pub fn chunk(&self, bytes: impl Into<Bytes>) -> bool {
        self.tx.send(Ok(bytes.into())).is_ok()
    }

    pub fn fail(&self, error: StreamError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    pub fn close(self) {}
}

/// In-memory transport with queued responses.
///
/// `abort()` on its readers is only counted; the body keeps flowing, which
/// models a transport that ignores cancellation.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    request_history: Arc<Mutex<Vec<StreamRequest>>>,
    aborts: Arc<AtomicUsize>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(self, response: MockResponse) -> Self {
        self.push_response(response);
        self
    }

    pub fn push_response(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<StreamRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    #[must_use]
    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued", &self.responses.lock().len())
            .field("requests", &self.request_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn ChunkReader>, StreamError> {
        self.request_history.lock().push(request.clone());

        let response = self.responses.lock().pop_front().ok_or_else(|| {
            StreamError::Transport("MockTransport: no responses queued".to_string())
        })?;

        let body = match response {
            MockResponse::Reject(err) => return Err(err),
            MockResponse::Body(items) => MockBody::Scripted(items.into()),
            MockResponse::Fed(rx) => MockBody::Fed(rx),
        };

        Ok(Box::new(MockReader {
            body,
            aborts: self.aborts.clone(),
        }))
    }
}

enum MockBody {
    Scripted(VecDeque<BodyItem>),
    Fed(mpsc::UnboundedReceiver<BodyItem>),
}

struct MockReader {
    body: MockBody,
    aborts: Arc<AtomicUsize>,
}

#[async_trait]
impl ChunkReader for MockReader {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError> {
        let item = match &mut self.body {
            MockBody::Scripted(items) => items.pop_front(),
            MockBody::Fed(rx) => rx.recv().await,
        };
        item.transpose()
    }

    fn abort(&mut self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> StreamRequest {
        StreamRequest::new(prompt).unwrap()
    }

    #[tokio::test]
    async fn test_scripted_body_in_order() {
        let transport =
            MockTransport::new().with_response(MockResponse::chunks(["one ", "two ", "three"]));

        let mut reader = transport.open(&request("count")).await.unwrap();
        let mut seen = Vec::new();
        while let Some(chunk) = reader.next_chunk().await.unwrap() {
            seen.push(chunk);
        }

        assert_eq!(seen, vec!["one ", "two ", "three"]);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.request_history()[0].prompt(), "count");
    }

    #[tokio::test]
    async fn test_error_item_surfaces() {
        let transport = MockTransport::new().with_response(MockResponse::chunks_then_error(
            ["partial"],
            StreamError::Transport("reset by peer".into()),
        ));

        let mut reader = transport.open(&request("x")).await.unwrap();
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), "partial");
        assert_eq!(
            reader.next_chunk().await.unwrap_err(),
            StreamError::Transport("reset by peer".into())
        );
    }

    #[tokio::test]
    async fn test_reject_and_empty_queue() {
        let transport = MockTransport::new()
            .with_response(MockResponse::reject(StreamError::server(503, "busy")));

        assert!(matches!(
            transport.open(&request("a")).await,
            Err(StreamError::Server { status: 503, .. })
        ));
        assert!(matches!(
            transport.open(&request("b")).await,
            Err(StreamError::Transport(_))
        ));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_fed_body_and_abort_counting() {
        let (response, feed) = MockResponse::fed();
        let transport = MockTransport::new().with_response(response);
        let mut reader = transport.open(&request("feed me")).await.unwrap();

        assert!(feed.chunk("first"));
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), "first");

        reader.abort();
        assert_eq!(transport.abort_count(), 1);

        assert!(feed.chunk("after abort"));
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), "after abort");

        feed.close();
        assert!(reader.next_chunk().await.unwrap().is_none());
    }

    #[test]
    fn test_empty_body_ends_immediately() {
        let transport = MockTransport::new().with_response(MockResponse::empty());
        let chunk = tokio_test::block_on(async {
            let mut reader = transport.open(&request("nothing")).await.unwrap();
            reader.next_chunk().await
        });
        assert_eq!(chunk, Ok(None));
    }
}
