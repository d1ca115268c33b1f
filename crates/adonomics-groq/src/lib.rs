//! Client for Groq's OpenAI-compatible chat-completions API.
//!
//! Only the non-streaming request path is implemented, with function/tool
//! calls, which is all the report synthesizer needs.

pub mod client;
pub mod error;
pub mod types;

pub use client::GroqClient;
pub use error::GroqError;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall, FunctionDefinition, Role,
    Tool, ToolCall, ToolChoice,
};
