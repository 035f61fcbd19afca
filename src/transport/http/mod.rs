pub mod auth;
pub mod client;
pub mod types;

pub use auth::AuthStrategy;
pub use client::{HttpClient, HttpConfig};
pub use types::{ApiToken, BaseUrl};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};

use super::{ChunkReader, Transport};
use crate::stream::{StreamError, StreamRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_CHAT_PATH: &str = "/ai-chat/chat";

/// Posts a prompt to the chat endpoint and hands back the raw body stream.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    auth: AuthStrategy,
    base_url: BaseUrl,
    chat_path: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("chat_path", &self.chat_path)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new() -> Result<Self, StreamError> {
        Self::with_http_config(HttpConfig::default())
    }

    pub fn with_http_config(http_config: HttpConfig) -> Result<Self, StreamError> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::None,
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_chat_path(mut self, chat_path: impl Into<String>) -> Self {
        self.chat_path = chat_path.into();
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.base_url.join(&self.chat_path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn ChunkReader>, StreamError> {
        let url = self.endpoint();
        let body = request.to_json()?;

        tracing::debug!(url = %url, prompt_len = request.prompt().len(), "Opening chat stream");

        let response = self
            .http
            .post(&url, &self.auth)
            .header("content-type", "application/json")
            .header("accept", "text/plain, text/event-stream, */*")
            .body(body)
            .send()
            .await
            .map_err(|e| StreamError::from_middleware(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chat endpoint returned an error status");
            return Err(StreamError::from_status(status.as_u16(), &error_body));
        }

        Ok(Box::new(HttpChunkReader {
            body: Some(response.bytes_stream().boxed()),
        }))
    }
}

struct HttpChunkReader {
    body: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
}

#[async_trait]
impl ChunkReader for HttpChunkReader {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError> {
        let Some(body) = self.body.as_mut() else {
            return Ok(None);
        };

        match body.next().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => {
                self.body = None;
                Err(StreamError::from_reqwest(&e))
            }
            None => {
                self.body = None;
                Ok(None)
            }
        }
    }

    fn abort(&mut self) {
        self.body = None;
    }
}
