use anyhow::Result;
use async_openai::types::{
    ChatChoice, ChatCompletionRequestMessage, ChatCompletionResponseMessage,
    CompletionUsage, CreateChatCompletionResponse, FinishReason, Model, Role,
};
use async_trait::async_trait;
use std::sync::Mutex;

use crate::openai::{ModelRequest, OpenAIClientTrait};

/// A fake chat-completion client for tests. Canned responses are
/// returned in order, and every request is recorded so tests can
/// verify which model was called.
///
/// # Example
///
/// ```
/// use pukeko::openai::OpenAIClientTrait;
/// use pukeko::openai::fake::FakeOpenAIClient;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = FakeOpenAIClient::new()
///         .with_response("- Try the library's baby time on Tuesdays.");
///
///     let response = client
///         .chat_completion("gpt-4o-mini".to_string(), vec![])
///         .await?;
///
///     let content = response.choices.first()
///         .and_then(|choice| choice.message.content.as_ref())
///         .map(String::from)
///         .unwrap_or_default();
///     assert_eq!(content, "- Try the library's baby time on Tuesdays.");
///     Ok(())
/// }
/// ```
pub struct FakeOpenAIClient {
    responses: Mutex<Vec<Option<String>>>,
    models: Vec<Model>,
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl Default for FakeOpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeOpenAIClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(vec![]),
            models: vec![],
            requests: Mutex::new(vec![]),
        }
    }

    /// Queue a response to be returned by the fake client.
    pub fn with_response(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Some(response.to_string()));
        self
    }

    /// Queue a response whose content is None, as the API can return.
    pub fn with_none_content_response(self) -> Self {
        self.responses.lock().unwrap().push(None);
        self
    }

    /// Configure the models returned by `list_models`.
    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = models;
        self
    }

    pub fn create_model(id: &str, provider: &str) -> Model {
        Model {
            id: id.to_string(),
            created: 0,
            object: "model".to_string(),
            owned_by: provider.to_string(),
        }
    }
}

#[async_trait]
impl OpenAIClientTrait for FakeOpenAIClient {
    #[allow(deprecated)]
    async fn chat_completion(
        &self,
        model: String,
        _messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        self.requests.lock().unwrap().push(ModelRequest {
            model_name: model.clone(),
        });

        let mut responses = self.responses.lock().unwrap();
        let content_option = if responses.is_empty() {
            Some("Fake default response".to_string())
        } else {
            responses.remove(0)
        };

        let message = ChatCompletionResponseMessage {
            role: Role::Assistant,
            content: content_option,
            #[allow(deprecated)]
            function_call: None,
            tool_calls: None,
            #[allow(deprecated)]
            refusal: None,
            audio: None,
        };

        let chat_choice = ChatChoice {
            index: 0,
            message,
            finish_reason: Some(FinishReason::Stop),
            logprobs: None,
        };

        let usage = CompletionUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            prompt_tokens_details: None,
            completion_tokens_details: None,
        };

        Ok(CreateChatCompletionResponse {
            id: "fake_id".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model: model.clone(),
            system_fingerprint: Some("fake-fingerprint".to_string()),
            service_tier: None,
            choices: vec![chat_choice],
            usage: Some(usage),
        })
    }

    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error> {
        Ok(self.models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_client_returns_responses_in_order() {
        let client = FakeOpenAIClient::new()
            .with_response("First response")
            .with_response("Second response");

        let response1 = client
            .chat_completion("gpt-4o-mini".to_string(), vec![])
            .await
            .unwrap();
        assert_eq!(
            response1.choices[0].message.content,
            Some("First response".to_string())
        );

        let response2 = client
            .chat_completion("gpt-4o-mini".to_string(), vec![])
            .await
            .unwrap();
        assert_eq!(
            response2.choices[0].message.content,
            Some("Second response".to_string())
        );

        // Exhausted queue falls back to the default response
        let response3 = client
            .chat_completion("gpt-4o-mini".to_string(), vec![])
            .await
            .unwrap();
        assert_eq!(
            response3.choices[0].message.content,
            Some("Fake default response".to_string())
        );
    }

    #[tokio::test]
    async fn test_fake_client_records_requests() {
        let client = FakeOpenAIClient::new().with_response("Test response");

        let _ = client
            .chat_completion("gpt-4o-mini".to_string(), vec![])
            .await
            .unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model_name, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_none_content_response() {
        let client = FakeOpenAIClient::new().with_none_content_response();

        let response = client
            .chat_completion("gpt-4o-mini".to_string(), vec![])
            .await
            .unwrap();
        assert_eq!(response.choices[0].message.content, None);
    }

    #[tokio::test]
    async fn test_fake_client_models() {
        let models = vec![
            FakeOpenAIClient::create_model("test-model-1", "test"),
            FakeOpenAIClient::create_model("test-model-2", "test"),
        ];

        let client = FakeOpenAIClient::new().with_models(models);
        let response = client.list_models().await.unwrap();

        assert_eq!(response.len(), 2);
        assert_eq!(response[0].id, "test-model-1");
        assert_eq!(response[1].id, "test-model-2");
    }
}
