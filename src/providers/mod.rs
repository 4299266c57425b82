//! Provider-specific research agents
//!
//! Each provider adapts its own request/response idiom behind the
//! [`ResearchAgent`](crate::agent::ResearchAgent) contract. OpenAI and
//! Ollama speak the same chat-completions wire format (Ollama exposes an
//! OpenAI-compatible endpoint), so they share one client; Gemini has its
//! own.

pub mod gemini;
pub mod ollama;
pub mod openai;

pub use gemini::{GeminiAgent, GeminiConfig};
pub use ollama::{OllamaAgent, OllamaConfig};
pub use openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatUsage, OpenAiAgent,
    OpenAiClient, OpenAiConfig,
};
