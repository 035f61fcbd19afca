//! Markdown blog posts with front matter, read from a directory.

pub mod front_matter;
pub mod render;
pub mod store;

pub use store::{
    BlogPost, BlogStore, DEFAULT_POSTS_DIR, ExportSummary, PostFilter, PostMeta, parse_date,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid front matter: {0}")]
    FrontMatter(String),

    #[error("Invalid post metadata: {0}")]
    Metadata(#[from] toml::de::Error),

    #[error("Failed to render markdown: {0}")]
    Render(String),

    #[error("Failed to write index: {0}")]
    Json(#[from] serde_json::Error),
}
