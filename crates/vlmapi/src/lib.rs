pub mod api;
pub mod models;
pub mod types;
pub mod utils;

pub use api::{discover_model, send_chat_completion, FALLBACK_MODEL_ID};
pub use types::{ChatMessage, ChatPart, ChatRole, VlmClient};
