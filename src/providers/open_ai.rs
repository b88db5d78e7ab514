use crate::config::ProviderConfig;
use crate::error::RecipeError;
use crate::providers::{ensure_success, http_client, resolve_api_key, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, RecipeError> {
        // Try config first, then fall back to environment variable
        let api_key = resolve_api_key(config.api_key.as_deref(), &["OPENAI_API_KEY"])?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        Ok(OpenAIProvider {
            client: http_client(config.timeout())?,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RecipeError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": prompt}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        let response = ensure_success(self.provider_name(), response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let recipe = response_body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        if recipe.trim().is_empty() {
            return Err(RecipeError::EmptyResponse(self.provider_name().to_string()));
        }

        Ok(recipe.to_string())
    }
}
