pub mod conversation;

pub use conversation::{ChatSession, ConversationUpdate};
