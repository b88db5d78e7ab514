use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::providers::{ensure_success, http_client, resolve_api_key, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// System prompt keeping the reply in the requested heading layout.
const SYSTEM_PROMPT: &str =
    "You are a home cook. Answer with the recipe only, using exactly the heading layout the user asks for.";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, RecipeError> {
        // Try config first, then fall back to environment variable
        let api_key = resolve_api_key(config.api_key.as_deref(), &["ANTHROPIC_API_KEY"])?;

        Ok(AnthropicProvider {
            client: http_client(config.timeout())?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RecipeError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": SYSTEM_PROMPT,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ]
            }))
            .send()
            .await?;

        let response = ensure_success(self.provider_name(), response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text: String = response_body["content"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(RecipeError::EmptyResponse(self.provider_name().to_string()));
        }

        Ok(text)
    }
}
