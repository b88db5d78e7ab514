use crate::config::{AppConfig, ProviderConfig};
use crate::error::RecipeError;
use crate::providers::{
    AnthropicProvider, GoogleImageProvider, GoogleProvider, ImageProvider, LlmProvider,
    OpenAIProvider,
};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a text generation provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, RecipeError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(RecipeError::BuilderError(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        match provider_name {
            "google" => Ok(Box::new(GoogleProvider::new(config)?)),
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            _ => Err(RecipeError::BuilderError(format!(
                "Unknown provider: {}",
                provider_name
            ))),
        }
    }

    /// Create the named provider, applying the top-level request timeout when
    /// the provider does not set its own.
    pub fn create_from_app_config(
        provider_name: &str,
        config: &AppConfig,
    ) -> Result<Box<dyn LlmProvider>, RecipeError> {
        let mut provider_config = config.provider(provider_name).ok_or_else(|| {
            RecipeError::BuilderError(format!(
                "Provider '{}' not found in configuration",
                provider_name
            ))
        })?;
        provider_config.timeout.get_or_insert(config.timeout);

        Self::create(provider_name, &provider_config)
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn LlmProvider>, RecipeError> {
        Self::create_from_app_config(&config.default_provider, config)
    }

    /// Create the image provider described by the `image` section
    pub fn create_image_provider(config: &AppConfig) -> Result<Box<dyn ImageProvider>, RecipeError> {
        let timeout = Some(Duration::from_secs(config.timeout));

        match config.image.provider.as_str() {
            "google" => Ok(Box::new(GoogleImageProvider::new(&config.image, timeout)?)),
            other => Err(RecipeError::BuilderError(format!(
                "Unknown image provider: {}",
                other
            ))),
        }
    }

    /// List all available text provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["google", "openai", "anthropic"]
    }
}
