//! Streaming AI chat client with a static blog pipeline.
//!
//! The core is [`stream::StreamConsumer`]: it sends a prompt through a
//! [`transport::Transport`] and exposes the answer as it arrives through a
//! [`stream::StreamHandle`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use chatstream::stream::StreamConsumer;
//! use chatstream::transport::HttpTransport;
//!
//! # async fn demo() -> Result<(), chatstream::stream::StreamError> {
//! let consumer = StreamConsumer::new(Arc::new(HttpTransport::new()?));
//! let state = consumer.start("What is photosynthesis?").wait().await;
//! println!("{}", state.text());
//! # Ok(())
//! # }
//! ```

pub mod blog;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod stream;
pub mod transport;

pub use error::{AppError, Result};
