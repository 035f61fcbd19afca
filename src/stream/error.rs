use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "Failed to connect to AI server";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Connection failed: {0}")]
    Transport(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StreamError {
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Maps a non-success response to an error, preferring the message the
    /// server put in the body over the generic status line.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        Self::Server { status, message }
    }

    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Configuration(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    #[must_use]
    pub fn from_middleware(err: &reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => Self::from_reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Self::Transport(e.to_string()),
        }
    }

    /// The text a user should see for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::InvalidInput(m)
            | Self::Transport(m)
            | Self::Decode(m)
            | Self::Configuration(m)
            | Self::Server { message: m, .. } => m.trim(),
        };

        if message.is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }
}

/// Best-effort lookup of a human-readable message in an error body.
///
/// Only `message`, `error.message` and a string `error` are consulted; any
/// other shape yields `None`.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;

    let candidates = [
        value.get("message"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("error"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(serde_json::Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_top_level_message() {
        let err = StreamError::from_status(429, r#"{"message": "rate limited"}"#);
        assert_eq!(err, StreamError::server(429, "rate limited"));
        assert_eq!(err.user_message(), "rate limited");
    }

    #[test]
    fn test_from_status_nested_error_message() {
        let err = StreamError::from_status(500, r#"{"error": {"message": "model overloaded"}}"#);
        assert_eq!(err.user_message(), "model overloaded");
    }

    #[test]
    fn test_from_status_string_error_field() {
        let err = StreamError::from_status(401, r#"{"success": false, "error": "unauthorized"}"#);
        assert_eq!(err.user_message(), "unauthorized");
    }

    #[test]
    fn test_from_status_unstructured_body() {
        let err = StreamError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message(), "Request failed with status code 502");
    }

    #[test]
    fn test_from_status_ignores_non_string_message() {
        let err = StreamError::from_status(500, r#"{"message": 42, "error": {"code": 7}}"#);
        assert_eq!(err.user_message(), "Request failed with status code 500");
    }

    #[test]
    fn test_from_status_skips_blank_message() {
        let err = StreamError::from_status(400, r#"{"message": "  ", "error": "bad prompt"}"#);
        assert_eq!(err.user_message(), "bad prompt");
    }

    #[test]
    fn test_user_message_fallback() {
        let err = StreamError::Transport(String::new());
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_error_display() {
        let err = StreamError::server(503, "overloaded");
        assert_eq!(err.to_string(), "Server error (503): overloaded");

        let err = StreamError::InvalidInput("prompt required".into());
        assert_eq!(err.to_string(), "Invalid input: prompt required");
    }
}
