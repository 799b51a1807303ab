pub mod chat_stream;
pub mod config;
pub mod message;
pub mod prompts;
pub mod quiz;
pub mod session;
pub mod upload;
