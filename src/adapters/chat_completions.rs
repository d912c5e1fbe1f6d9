use crate::config::toml_config::GeneratorConfig;
use crate::domain::model::{ChatMessage, ChatRole};
use crate::domain::ports::CodeProducer;
use crate::utils::error::{ProviderError, PublishError, Result};
use crate::utils::validation::{validate_secret, validate_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// [`CodeProducer`] for any OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionsProducer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: Option<String>,
}

impl ChatCompletionsProducer {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        validate_url("generator.endpoint", &config.endpoint)?;
        validate_secret("generator.api_key", config.api_key.as_deref().unwrap_or_default())?;

        let client = Client::builder()
            .build()
            .map_err(|e| PublishError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CodeProducer for ChatCompletionsProducer {
    async fn generate(&self, messages: &[ChatMessage]) -> std::result::Result<String, ProviderError> {
        let system = self.system_prompt.as_ref().map(|prompt| ChatMessage {
            role: ChatRole::System,
            content: prompt.clone(),
        });
        let body = CompletionRequest {
            model: &self.model,
            messages: system.iter().chain(messages.iter()).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.endpoint);
        tracing::debug!("Requesting completion from {} (model {})", url, self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Decode("completion has no message content".to_string()))
    }
}
