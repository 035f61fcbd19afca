use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    #[default]
    Idle,
    Streaming,
    Done,
    Error,
}

impl StreamStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable record of one streaming request.
///
/// Text only grows, status only moves forward, and nothing changes once the
/// status is terminal. The mutators return `false` when a transition is not
/// allowed from the current status and leave the state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamState {
    text: String,
    status: StreamStatus,
    error_message: Option<String>,
}

impl StreamState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn status(&self) -> StreamStatus {
        self.status
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn begin(&mut self) -> bool {
        if self.status != StreamStatus::Idle {
            return false;
        }
        self.status = StreamStatus::Streaming;
        true
    }

    pub(crate) fn append(&mut self, delta: &str) -> bool {
        if self.status != StreamStatus::Streaming {
            return false;
        }
        self.text.push_str(delta);
        true
    }

    pub(crate) fn complete(&mut self) -> bool {
        if self.status != StreamStatus::Streaming {
            return false;
        }
        self.status = StreamStatus::Done;
        true
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = StreamStatus::Error;
        self.error_message = Some(message.into());
        true
    }
}
