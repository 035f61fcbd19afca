pub mod history;
pub mod session;

pub use history::{ChatHistory, ChatMessage, GREETING, Role};
pub use session::ChatSession;
