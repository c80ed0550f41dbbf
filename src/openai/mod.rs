pub mod fake;
pub mod real;

use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionResponse, Model,
};
use async_trait::async_trait;

/// Records which model a request was sent to, for verification in
/// tests.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model_name: String,
}

/// Abstracts the chat-completion client so the curation layer can be
/// exercised with a fake in tests.
///
/// The service treats the model's reply as an opaque string: it is
/// rendered to the user but never parsed or validated here.
#[async_trait]
pub trait OpenAIClientTrait: Send + Sync {
    /// Send a message sequence to the model and return the full
    /// response.
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error>;

    /// List the models the configured endpoint offers.
    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error>;
}
