//! Incremental consumption of a streamed chat response.
//!
//! [`StreamConsumer::start`] issues one request and returns a
//! [`StreamHandle`] whose [`StreamState`] grows as chunks arrive and ends in
//! either [`StreamStatus::Done`] or [`StreamStatus::Error`]. Failures never
//! escape as errors; they become the terminal state with the text received so
//! far left in place.

pub mod consumer;
pub mod decoder;
pub mod error;
pub mod request;
pub mod state;

pub use consumer::{CancelHandle, StreamConsumer, StreamHandle};
pub use decoder::Utf8Decoder;
pub use error::StreamError;
pub use request::StreamRequest;
pub use state::{StreamState, StreamStatus};
