use serde::Serialize;

use super::error::StreamError;

pub const PROMPT_REQUIRED: &str = "prompt required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    prompt: String,
}

impl StreamRequest {
    pub fn new(prompt: impl Into<String>) -> Result<Self, StreamError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(StreamError::InvalidInput(PROMPT_REQUIRED.to_string()));
        }
        Ok(Self { prompt })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn to_json(&self) -> Result<String, StreamError> {
        serde_json::to_string(self).map_err(|e| StreamError::InvalidInput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace() {
        for prompt in ["", "   ", "\n\t"] {
            let err = StreamRequest::new(prompt).unwrap_err();
            assert_eq!(err, StreamError::InvalidInput(PROMPT_REQUIRED.into()));
        }
    }

    #[test]
    fn keeps_prompt_verbatim() {
        let request = StreamRequest::new("  explain photosynthesis ").unwrap();
        assert_eq!(request.prompt(), "  explain photosynthesis ");
    }

    #[test]
    fn wire_body_shape() {
        let request = StreamRequest::new("hi").unwrap();
        assert_eq!(request.to_json().unwrap(), r#"{"prompt":"hi"}"#);
    }
}
