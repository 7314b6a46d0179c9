pub mod chat;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod knowledge;
pub mod llm_interaction;
pub mod resolver;
pub mod session;
pub mod web_server;

pub use config::ChatConfig;
pub use conversation::{AwaitingFlag, ChatMessage, ConversationState, Role};
pub use error::ResolveError;
pub use resolver::MessageResolver;
