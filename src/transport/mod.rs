pub mod http;
pub mod mock;

pub use http::{AuthStrategy, BaseUrl, HttpClient, HttpConfig, HttpTransport};
pub use mock::{MockFeed, MockResponse, MockTransport};

use async_trait::async_trait;
use bytes::Bytes;

use crate::stream::{StreamError, StreamRequest};

/// Something that can open a request whose body arrives incrementally.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn ChunkReader>, StreamError>;
}

/// Reader over the body of one open response.
#[async_trait]
pub trait ChunkReader: Send {
    /// `Ok(None)` marks the end of the body.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError>;

    /// Stops reading and releases the underlying connection.
    fn abort(&mut self);
}
