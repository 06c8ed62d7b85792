use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{Client, config::OpenAIConfig};
use async_trait::async_trait;
use tracing::debug;

use crate::config::ResponderConfig;
use crate::error::ResponderError;

use super::prompt;
use super::responder::Responder;

/// Responder backed by an OpenAI-compatible chat completion endpoint.
///
/// The default configuration points at a local Ollama server.
pub struct OpenAiResponder {
    client: Client<OpenAIConfig>,
    pub model: String,
    temperature: f32,
}

impl OpenAiResponder {
    pub fn new(config: &ResponderConfig) -> Self {
        let openai = OpenAIConfig::new()
            .with_api_base(&config.base_url)
            .with_api_key(&config.api_key);

        Self {
            client: Client::with_config(openai),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    async fn respond(&self, query: &str) -> Result<String, ResponderError> {
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt::build_prompt(query))
            .build()?
            .into();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message])
            .temperature(self.temperature)
            .build()?;

        debug!("Sending responder query to model {}", self.model);
        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ResponderError::Empty)
    }
}
