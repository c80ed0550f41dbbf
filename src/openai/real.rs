use crate::openai::OpenAIClientTrait;
use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse, Model,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;

pub struct RealOpenAIClient {
    client: Client<OpenAIConfig>,
}

impl RealOpenAIClient {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

/// Build a client when an API key is configured; a missing key means
/// the curated-suggestions feature is simply off and the rule-based
/// tips still work.
pub fn maybe_create_openai_client(
    api_key: Option<String>,
    api_base: Option<String>,
) -> Result<Option<Arc<dyn OpenAIClientTrait>>> {
    let Some(api_key) = api_key else {
        return Ok(None);
    };
    if api_key.trim().is_empty() {
        return Err(anyhow::anyhow!("OpenAI API key is empty"));
    }

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(api_base) = api_base {
        config = config.with_api_base(api_base);
    }
    Ok(Some(Arc::new(RealOpenAIClient::new(Client::with_config(
        config,
    )))))
}

#[async_trait]
impl OpenAIClientTrait for RealOpenAIClient {
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response)
    }

    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error> {
        let response = self.client.models().list().await?;
        Ok(response.data)
    }
}
