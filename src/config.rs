use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Text generation provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Image generation settings
    #[serde(default)]
    pub image: ImageConfig,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Cuisine used when the caller does not pick one
    #[serde(default = "default_cuisine")]
    pub default_cuisine: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific text generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.5-flash", "gpt-4.1-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Request timeout in seconds (defaults to the top-level `timeout`)
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    /// Enabled provider with default sampling settings
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            timeout: None,
        }
    }

    /// Builder-style API key override
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder-style base URL override
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Configuration for recipe photo generation
#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// Whether a photo is generated alongside each recipe
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Image provider name
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Image model identifier
    #[serde(default = "default_image_model")]
    pub model: String,
    /// API key (falls back to GEMINI_API_KEY / GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for API endpoint
    pub base_url: Option<String>,
    /// How many ingredient names are woven into the image prompt
    #[serde(default = "default_prompt_ingredients")]
    pub prompt_ingredients: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: default_image_model(),
            api_key: None,
            base_url: None,
            prompt_ingredients: default_prompt_ingredients(),
        }
    }
}

/// Configuration for provider fallback and retry behavior
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
    /// Number of retry attempts per provider before fallback
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Delay unit between retries in milliseconds (grows with each attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            default_provider(),
            ProviderConfig::new(default_text_model()),
        );

        Self {
            default_provider: default_provider(),
            providers,
            image: ImageConfig::default(),
            fallback: FallbackConfig::default(),
            default_cuisine: default_cuisine(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_enabled() -> bool {
    true
}

pub(crate) fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_prompt_ingredients() -> usize {
    5
}

fn default_cuisine() -> String {
    "中国菜".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_MUSE__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_MUSE__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Configuration of the named provider, falling back to defaults for the
    /// built-in Google provider when nothing is configured.
    pub fn provider(&self, name: &str) -> Option<ProviderConfig> {
        self.providers.get(name).cloned().or_else(|| {
            (name == "google").then(|| ProviderConfig::new(default_text_model()))
        })
    }
}

/// Load configuration from file and environment variables
///
/// Environment variable format: RECIPE_MUSE__PROVIDERS__GOOGLE__API_KEY
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_MUSE__IMAGE__MODEL
        .add_source(
            Environment::with_prefix("RECIPE_MUSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_provider(), "google");
        assert_eq!(default_temperature(), 0.7);
        assert_eq!(default_max_tokens(), 2000);
        assert_eq!(default_retry_attempts(), 3);
        assert_eq!(default_retry_delay_ms(), 1000);
        assert_eq!(default_cuisine(), "中国菜");
    }

    #[test]
    fn test_fallback_config_default() {
        let fallback = FallbackConfig::default();
        assert!(!fallback.enabled);
        assert!(fallback.order.is_empty());
        assert_eq!(fallback.retry_attempts, 3);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.default_provider, "google");
        assert!(config.providers.is_empty());
        assert!(config.image.enabled);
        assert_eq!(config.image.model, "gemini-2.5-flash-image");
        assert_eq!(config.image.prompt_ingredients, 5);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_provider_section_from_toml() {
        let config = from_toml(
            r#"
            default_provider = "openai"
            default_cuisine = "日本菜"

            [providers.openai]
            model = "gpt-4.1-mini"
            temperature = 0.2

            [image]
            enabled = false
            "#,
        );

        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_cuisine, "日本菜");
        let openai = &config.providers["openai"];
        assert!(openai.enabled);
        assert_eq!(openai.model, "gpt-4.1-mini");
        assert_eq!(openai.temperature, 0.2);
        assert_eq!(openai.max_tokens, 2000);
        assert!(!config.image.enabled);
    }

    #[test]
    fn test_google_provider_has_implicit_defaults() {
        let config = from_toml("");
        let google = config.provider("google").unwrap();
        assert_eq!(google.model, "gemini-2.5-flash");
        assert!(config.provider("anthropic").is_none());
    }

    #[test]
    fn test_default_config_has_google_provider() {
        let config = AppConfig::default();
        assert!(config.providers.contains_key("google"));
        assert_eq!(config.fallback.retry_attempts, 3);
    }
}
