pub mod chat;
pub mod places;

pub use chat::{ChatClient, ChatMessage, ChatModel, ChatRequest};
pub use places::PlacesClient;
