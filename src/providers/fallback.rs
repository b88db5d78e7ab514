use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::providers::{LlmProvider, ProviderFactory};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::sleep;

/// Tries providers in order, retrying each with a growing delay.
pub struct FallbackProvider {
    providers: Vec<Box<dyn LlmProvider>>,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl FallbackProvider {
    /// Create a new fallback provider from configuration
    pub fn new(config: &AppConfig) -> Result<Self, RecipeError> {
        if !config.fallback.enabled {
            // If fallback is disabled, just use the default provider
            let default_provider = ProviderFactory::get_default_provider(config)?;
            return Ok(FallbackProvider {
                providers: vec![default_provider],
                retry_attempts: 1,
                retry_delay_ms: 0,
            });
        }

        let mut providers = Vec::new();

        // Create providers in fallback order
        for provider_name in &config.fallback.order {
            match ProviderFactory::create_from_app_config(provider_name, config) {
                Ok(provider) => {
                    info!("Added '{}' to fallback chain", provider_name);
                    providers.push(provider);
                }
                Err(e) => {
                    warn!("Skipping provider '{}' in fallback order: {}", provider_name, e);
                }
            }
        }

        if providers.is_empty() {
            return Err(RecipeError::BuilderError(
                "No providers available in fallback configuration".to_string(),
            ));
        }

        Ok(FallbackProvider {
            providers,
            retry_attempts: config.fallback.retry_attempts.max(1),
            retry_delay_ms: config.fallback.retry_delay_ms,
        })
    }

    /// Build a chain from already constructed providers
    pub fn from_providers(
        providers: Vec<Box<dyn LlmProvider>>,
        retry_attempts: u32,
        retry_delay_ms: u64,
    ) -> Self {
        FallbackProvider {
            providers,
            retry_attempts: retry_attempts.max(1),
            retry_delay_ms,
        }
    }

    /// Try a provider, waiting `retry_delay_ms * attempt` between attempts
    async fn try_provider_with_retry(
        &self,
        provider: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<String, String> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry_attempts {
            debug!(
                "Generating with {} (attempt {}/{})",
                provider.provider_name(),
                attempt,
                self.retry_attempts
            );

            match provider.generate(prompt).await {
                Ok(text) => {
                    info!("Generated recipe using {}", provider.provider_name());
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        "Provider {} failed (attempt {}/{}): {}",
                        provider.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = e.to_string();
                }
            }

            // Sleep only if we need to retry
            if attempt < self.retry_attempts {
                let delay = Duration::from_millis(self.retry_delay_ms * attempt as u64);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl LlmProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        "fallback"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RecipeError> {
        let mut all_errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            match self.try_provider_with_retry(provider.as_ref(), prompt).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    all_errors.push(format!("{}: {}", provider.provider_name(), e));
                }
            }
        }

        Err(RecipeError::Provider(format!(
            "All providers failed:\n{}",
            all_errors.join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackConfig, ProviderConfig};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails a fixed number of times, then answers.
    struct FlakyProvider {
        name: &'static str,
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<String, RecipeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(RecipeError::Provider("temporarily unavailable".to_string()))
            } else {
                Ok(format!("**标题：** {}", self.name))
            }
        }
    }

    fn create_test_config_with_fallback() -> AppConfig {
        let mut providers = HashMap::new();
        providers.insert(
            "openai".to_string(),
            ProviderConfig::new("gpt-4.1-mini").with_api_key("test-key-1"),
        );
        providers.insert(
            "anthropic".to_string(),
            ProviderConfig::new("claude-sonnet-4-5").with_api_key("test-key-2"),
        );

        AppConfig {
            default_provider: "openai".to_string(),
            providers,
            fallback: FallbackConfig {
                enabled: true,
                order: vec!["openai".to_string(), "anthropic".to_string()],
                retry_attempts: 2,
                retry_delay_ms: 50,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fallback_multiple_providers() {
        let fallback = FallbackProvider::new(&create_test_config_with_fallback()).unwrap();
        assert_eq!(fallback.providers.len(), 2);
        assert_eq!(fallback.provider_name(), "fallback");
    }

    #[tokio::test]
    async fn test_fallback_disabled() {
        let mut config = create_test_config_with_fallback();
        config.fallback.enabled = false;

        let fallback = FallbackProvider::new(&config).unwrap();
        // With fallback disabled, only one provider should be in the list
        assert_eq!(fallback.providers.len(), 1);
        assert_eq!(fallback.retry_attempts, 1);
    }

    #[tokio::test]
    async fn test_fallback_no_providers() {
        let config = AppConfig {
            providers: HashMap::new(),
            fallback: FallbackConfig {
                enabled: true,
                order: vec!["openai".to_string()],
                retry_attempts: 3,
                retry_delay_ms: 100,
            },
            ..Default::default()
        };

        let result = FallbackProvider::new(&config);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("No providers available"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let flaky = FlakyProvider {
            name: "flaky",
            failures: 2,
            calls: calls.clone(),
        };

        let fallback = FallbackProvider::from_providers(vec![Box::new(flaky)], 3, 1000);
        let text = fallback.generate("prompt").await.unwrap();
        assert_eq!(text, "**标题：** flaky");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_through_to_next_provider() {
        let first_calls = Arc::new(AtomicU32::new(0));
        let second_calls = Arc::new(AtomicU32::new(0));
        let broken = FlakyProvider {
            name: "broken",
            failures: u32::MAX,
            calls: first_calls.clone(),
        };
        let healthy = FlakyProvider {
            name: "healthy",
            failures: 0,
            calls: second_calls.clone(),
        };

        let fallback =
            FallbackProvider::from_providers(vec![Box::new(broken), Box::new(healthy)], 2, 10);
        let text = fallback.generate("prompt").await.unwrap();
        assert_eq!(text, "**标题：** healthy");
        assert_eq!(first_calls.load(Ordering::SeqCst), 2);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_providers_fail() {
        let broken = FlakyProvider {
            name: "broken",
            failures: u32::MAX,
            calls: Arc::new(AtomicU32::new(0)),
        };

        let fallback = FallbackProvider::from_providers(vec![Box::new(broken)], 2, 10);
        let err = fallback.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("All providers failed"));
        assert!(err.to_string().contains("broken: Provider error: temporarily unavailable"));
    }
}
