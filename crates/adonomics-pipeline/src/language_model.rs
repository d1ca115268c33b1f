use adonomics_groq::{ChatRequest, ChatResponse, GroqClient, GroqError};
use async_trait::async_trait;

/// A chat-completions backend that supports forced function calls.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GroqError>;
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GroqError> {
        self.chat(request).await
    }
}
