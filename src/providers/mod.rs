mod anthropic;
mod factory;
mod fallback;
mod google;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::{GoogleImageProvider, GoogleProvider};
pub use open_ai::OpenAIProvider;
pub use prompt::{build_image_prompt, build_recipe_prompt, CUISINES, RECIPE_PROMPT_TEMPLATE};

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::RecipeError;
use crate::model::GeneratedImage;

/// Unified trait for all text generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Send a prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, RecipeError>;
}

/// Trait for image generation providers
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Generate a single image for the prompt
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, RecipeError>;
}

/// HTTP client shared by the providers, with an optional request timeout.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<Client, RecipeError> {
    let builder = Client::builder();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    Ok(builder.build()?)
}

/// Turn non-success HTTP statuses into a provider error carrying the body.
pub(crate) async fn ensure_success(provider: &str, response: Response) -> Result<Response, RecipeError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RecipeError::Provider(format!(
        "{} API error ({}): {}",
        provider, status, body
    )))
}

/// Resolve an API key from configuration, then from the listed environment
/// variables in order.
pub(crate) fn resolve_api_key(configured: Option<&str>, env_vars: &[&str]) -> Result<String, RecipeError> {
    configured
        .map(str::to_string)
        .or_else(|| env_vars.iter().find_map(|var| std::env::var(var).ok()))
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            RecipeError::BuilderError(format!(
                "{} not found in config or environment",
                env_vars.join(" / ")
            ))
        })
}
