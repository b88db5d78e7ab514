use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use tokio::task::JoinHandle;

use crate::config::{default_text_model, AppConfig, ProviderConfig};
use crate::error::RecipeError;
use crate::model::{GeneratedImage, ParsedRecipe, RecipeRecord};
use crate::parse_recipe;
use crate::providers::{
    build_image_prompt, build_recipe_prompt, FallbackProvider, ImageProvider, LlmProvider,
    ProviderFactory,
};

/// Text generation back ends selectable from the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    OpenAI,
    Anthropic,
}

impl Provider {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Parse a provider name, as used on the command line and in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Some(Provider::Google),
            "openai" => Some(Provider::OpenAI),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    fn default_model(&self) -> String {
        match self {
            Provider::Google => default_text_model(),
            Provider::OpenAI => "gpt-4.1-mini".to_string(),
            Provider::Anthropic => "claude-sonnet-4-5".to_string(),
        }
    }
}

/// A generated recipe: the raw model output and the fields parsed from it
#[derive(Debug, Clone)]
pub struct GeneratedRecipe {
    pub raw: String,
    pub parsed: ParsedRecipe,
    pub cuisine: String,
    pub ingredients: Vec<String>,
}

impl GeneratedRecipe {
    /// Record to hand to the persistence service when the user favorites it
    pub fn to_record(&self, user_id: impl Into<String>) -> RecipeRecord {
        RecipeRecord::from_parsed(
            &self.parsed,
            Some(self.cuisine.as_str()),
            user_id,
            Utc::now().timestamp_millis(),
        )
    }
}

/// Photo request running in the background.
///
/// The recipe is usable while this is pending; a failed photo only logs a
/// warning and resolves to `None`.
#[derive(Debug)]
pub struct PendingImage {
    handle: Option<JoinHandle<Result<GeneratedImage, RecipeError>>>,
}

impl PendingImage {
    /// A pending image that resolves to `None` right away
    pub fn disabled() -> Self {
        PendingImage { handle: None }
    }

    /// True once the request has resolved (or was never issued)
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the photo
    pub async fn wait(self) -> Option<GeneratedImage> {
        let handle = self.handle?;

        match handle.await {
            Ok(Ok(image)) => Some(image),
            Ok(Err(e)) => {
                warn!("Image generation failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Image generation task did not complete: {}", e);
                None
            }
        }
    }
}

/// Generates recipes for a fixed selection of ingredients
pub struct RecipeGenerator {
    text_provider: Box<dyn LlmProvider>,
    image_provider: Option<Arc<dyn ImageProvider>>,
    ingredients: Vec<String>,
    cuisine: String,
    prompt_ingredients: usize,
}

impl RecipeGenerator {
    /// Creates a new builder for generating recipes
    ///
    /// # Example
    /// ```
    /// use recipe_muse::RecipeGenerator;
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .ingredient("番茄")
    ///     .ingredient("鸡蛋");
    /// ```
    pub fn builder() -> RecipeGeneratorBuilder {
        RecipeGeneratorBuilder::default()
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn cuisine(&self) -> &str {
        &self.cuisine
    }

    /// Whether a photo will be requested
    pub fn has_image_provider(&self) -> bool {
        self.image_provider.is_some()
    }

    /// The prompt sent to the text generation service
    pub fn recipe_prompt(&self) -> String {
        build_recipe_prompt(&self.ingredients, &self.cuisine)
    }

    /// The prompt sent to the image generation service for a parsed recipe
    pub fn image_prompt(&self, parsed: &ParsedRecipe) -> String {
        build_image_prompt(
            parsed.display_title(),
            &parsed.ingredient_names(Some(self.prompt_ingredients)),
        )
    }

    /// Generate a recipe and parse it
    pub async fn generate(&self) -> Result<GeneratedRecipe, RecipeError> {
        info!(
            "Generating {} recipe with {} ({} ingredients)",
            self.cuisine,
            self.text_provider.provider_name(),
            self.ingredients.len()
        );

        let raw = self.text_provider.generate(&self.recipe_prompt()).await?;
        let parsed = parse_recipe(&raw);

        if parsed.is_empty() {
            warn!("Generated text contained none of the expected headings");
        }

        Ok(GeneratedRecipe {
            raw,
            parsed,
            cuisine: self.cuisine.clone(),
            ingredients: self.ingredients.clone(),
        })
    }

    /// Generate a photo for an already parsed recipe
    pub async fn generate_image(&self, parsed: &ParsedRecipe) -> Result<GeneratedImage, RecipeError> {
        let provider = self.image_provider.as_ref().ok_or_else(|| {
            RecipeError::ImageGeneration("image generation is disabled".to_string())
        })?;

        provider.generate_image(&self.image_prompt(parsed)).await
    }

    /// Generate a recipe, then start its photo in the background.
    ///
    /// The photo request is only issued once the recipe text has been parsed,
    /// and its outcome never affects the returned recipe. Must be called
    /// within a tokio runtime.
    pub async fn generate_with_image(&self) -> Result<(GeneratedRecipe, PendingImage), RecipeError> {
        let recipe = self.generate().await?;

        let pending = match &self.image_provider {
            Some(provider) => {
                let provider = Arc::clone(provider);
                let prompt = self.image_prompt(&recipe.parsed);
                info!("Requesting photo for {}", recipe.parsed.display_title());
                PendingImage {
                    handle: Some(tokio::spawn(async move {
                        provider.generate_image(&prompt).await
                    })),
                }
            }
            None => PendingImage::disabled(),
        };

        Ok((recipe, pending))
    }
}

/// Builder for configuring a [`RecipeGenerator`]
#[derive(Default)]
pub struct RecipeGeneratorBuilder {
    ingredients: Vec<String>,
    cuisine: Option<String>,
    provider: Option<Provider>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    with_image: Option<bool>,
    config: Option<AppConfig>,
    text_provider: Option<Box<dyn LlmProvider>>,
    image_provider: Option<Arc<dyn ImageProvider>>,
}

impl RecipeGeneratorBuilder {
    /// Add one selected ingredient
    pub fn ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredients.push(ingredient.into());
        self
    }

    /// Add several selected ingredients
    pub fn ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .extend(ingredients.into_iter().map(Into::into));
        self
    }

    /// Cuisine style, e.g. "意大利菜"
    pub fn cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    /// Use a specific text provider instead of the configured default
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key for the text provider
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the text provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the text provider at a custom endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a timeout for HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Enable or disable photo generation (defaults to the `image.enabled` setting)
    pub fn with_image(mut self, enabled: bool) -> Self {
        self.with_image = Some(enabled);
        self
    }

    /// Use this configuration instead of loading `config.toml` and the environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an already constructed text provider
    pub fn text_provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.text_provider = Some(provider);
        self
    }

    /// Use an already constructed image provider
    pub fn image_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.image_provider = Some(provider);
        self
    }

    /// Validate the selection and set up the providers
    ///
    /// # Errors
    /// Returns `RecipeError` if:
    /// - No ingredient was selected
    /// - The configuration cannot be loaded
    /// - The text provider is unknown, disabled or lacks an API key
    pub fn build(self) -> Result<RecipeGenerator, RecipeError> {
        let ingredients: Vec<String> = self
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        if ingredients.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Select at least one ingredient".to_string(),
            ));
        }

        let mut config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs().max(1);
        }

        let cuisine = self
            .cuisine
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| config.default_cuisine.clone());

        let text_provider = match self.text_provider {
            Some(provider) => provider,
            None if self.provider.is_some()
                || self.api_key.is_some()
                || self.model.is_some()
                || self.base_url.is_some() =>
            {
                let provider = self
                    .provider
                    .or_else(|| Provider::from_name(&config.default_provider))
                    .unwrap_or(Provider::Google);

                let mut provider_config = config
                    .provider(provider.as_str())
                    .unwrap_or_else(|| ProviderConfig::new(provider.default_model()));
                if let Some(api_key) = self.api_key {
                    provider_config.api_key = Some(api_key);
                }
                if let Some(model) = self.model {
                    provider_config.model = model;
                }
                if let Some(base_url) = self.base_url {
                    provider_config.base_url = Some(base_url);
                }
                provider_config.timeout.get_or_insert(config.timeout);

                ProviderFactory::create(provider.as_str(), &provider_config)?
            }
            None => Box::new(FallbackProvider::new(&config)?),
        };

        let image_wanted = self.with_image.unwrap_or(config.image.enabled);
        let image_provider = if !image_wanted {
            None
        } else if let Some(provider) = self.image_provider {
            Some(provider)
        } else {
            match ProviderFactory::create_image_provider(&config) {
                Ok(provider) => Some(Arc::from(provider)),
                Err(e) => {
                    warn!("Photo generation disabled: {}", e);
                    None
                }
            }
        };

        Ok(RecipeGenerator {
            text_provider,
            image_provider,
            ingredients,
            cuisine,
            prompt_ingredients: config.image.prompt_ingredients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, RecipeError> {
            Ok(self.0.to_string())
        }
    }

    fn offline_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.image.enabled = false;
        config
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(Provider::from_name("Gemini"), Some(Provider::Google));
        assert_eq!(Provider::from_name("claude"), Some(Provider::Anthropic));
        assert_eq!(Provider::from_name("openai").unwrap().as_str(), "openai");
        assert_eq!(Provider::from_name("mistral"), None);
    }

    #[test]
    fn test_build_requires_ingredients() {
        let result = RecipeGenerator::builder()
            .ingredients(["  ", ""])
            .config(offline_config())
            .text_provider(Box::new(CannedProvider("")))
            .build();
        assert!(matches!(result, Err(RecipeError::InvalidInput(_))));
    }

    #[test]
    fn test_build_uses_default_cuisine() {
        let generator = RecipeGenerator::builder()
            .ingredient(" 番茄 ")
            .config(offline_config())
            .text_provider(Box::new(CannedProvider("")))
            .build()
            .unwrap();

        assert_eq!(generator.cuisine(), "中国菜");
        assert_eq!(generator.ingredients(), ["番茄"]);
        assert!(!generator.has_image_provider());
        assert!(generator.recipe_prompt().contains("中国菜风格的家常菜谱：番茄。"));
    }

    #[test]
    fn test_build_with_explicit_provider() {
        let generator = RecipeGenerator::builder()
            .ingredient("豆腐")
            .cuisine("日本菜")
            .provider(Provider::OpenAI)
            .api_key("test-key")
            .config(offline_config())
            .build()
            .unwrap();
        assert_eq!(generator.text_provider.provider_name(), "openai");
        assert_eq!(generator.cuisine(), "日本菜");
    }

    #[test]
    fn test_build_with_unconfigured_default_provider_fails() {
        let mut config = offline_config();
        config.providers.clear();
        config.default_provider = "anthropic".to_string();

        let result = RecipeGenerator::builder()
            .ingredient("豆腐")
            .config(config)
            .build();
        match result {
            Err(RecipeError::BuilderError(message)) => {
                assert!(message.contains("not found in configuration"))
            }
            _ => panic!("expected a builder error"),
        }
    }

    #[test]
    fn test_build_with_disabled_provider_fails() {
        let mut provider_config = ProviderConfig::new("claude-sonnet-4-5").with_api_key("test-key");
        provider_config.enabled = false;

        let mut config = offline_config();
        config
            .providers
            .insert("anthropic".to_string(), provider_config);

        let result = RecipeGenerator::builder()
            .ingredient("豆腐")
            .provider(Provider::Anthropic)
            .config(config)
            .build();
        match result {
            Err(RecipeError::BuilderError(message)) => {
                assert!(message.contains("not enabled"))
            }
            _ => panic!("expected a builder error"),
        }
    }

    #[tokio::test]
    async fn test_generate_parses_output() {
        let generator = RecipeGenerator::builder()
            .ingredients(["番茄", "鸡蛋"])
            .config(offline_config())
            .text_provider(Box::new(CannedProvider(
                "**标题：** 番茄炒蛋\n**材料:**\n- 番茄\n- 鸡蛋\n**步骤:**\n1. 打蛋",
            )))
            .build()
            .unwrap();

        let recipe = generator.generate().await.unwrap();
        assert_eq!(recipe.parsed.title, "番茄炒蛋");
        assert_eq!(recipe.parsed.instructions, "1. 打蛋");

        let record = recipe.to_record("user-1");
        assert_eq!(record.ingredients, vec!["番茄", "鸡蛋"]);
        assert_eq!(record.cuisine.as_deref(), Some("中国菜"));
        assert!(record.created_at > 0);
    }

    #[tokio::test]
    async fn test_image_disabled() {
        let generator = RecipeGenerator::builder()
            .ingredient("番茄")
            .config(offline_config())
            .text_provider(Box::new(CannedProvider("**标题：** 番茄汤")))
            .build()
            .unwrap();

        let (recipe, pending) = generator.generate_with_image().await.unwrap();
        assert_eq!(recipe.parsed.title, "番茄汤");
        assert!(pending.is_finished());
        assert!(pending.wait().await.is_none());

        let err = generator.generate_image(&recipe.parsed).await.unwrap_err();
        assert!(matches!(err, RecipeError::ImageGeneration(_)));
    }

    #[test]
    fn test_image_prompt_uses_top_ingredients() {
        let generator = RecipeGenerator::builder()
            .ingredient("番茄")
            .config(offline_config())
            .text_provider(Box::new(CannedProvider("")))
            .build()
            .unwrap();

        let parsed = ParsedRecipe {
            title: String::new(),
            ingredients: "- a\n- b\n- c\n- d\n- e\n- f".to_string(),
            ..Default::default()
        };
        let prompt = generator.image_prompt(&parsed);
        assert!(prompt.starts_with("A delicious Untitled Recipe dish made with a, b, c, d, e,"));
        assert!(!prompt.contains(" f,"));
    }
}
