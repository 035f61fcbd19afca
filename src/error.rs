use thiserror::Error;

use crate::blog::BlogError;
use crate::config::ConfigError;
use crate::stream::StreamError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Carries the message a user should see, not the raw variant.
    #[error("{}", .0.user_message())]
    Stream(#[from] StreamError),

    #[error("Blog error: {0}")]
    Blog(#[from] BlogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    /// A stream that settled in the error state; holds its `errorMessage`.
    #[error("{0}")]
    StreamFailed(String),

    #[error("Stream cancelled")]
    Cancelled,

    #[error("No complete answer within {0}s")]
    TimedOut(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_shows_user_message() {
        let err: AppError = StreamError::server(429, "rate limited").into();
        assert_eq!(err.to_string(), "rate limited");

        let err: AppError = StreamError::Transport(String::new()).into();
        assert_eq!(err.to_string(), "Failed to connect to AI server");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_error_from_blog() {
        let err: AppError = BlogError::FrontMatter("line 2: empty key".into()).into();
        assert_eq!(
            err.to_string(),
            "Blog error: Invalid front matter: line 2: empty key"
        );
    }

    #[test]
    fn test_post_not_found_display() {
        let err = AppError::PostNotFound("missing".to_string());
        assert_eq!(err.to_string(), "Post not found: missing");
    }
}
