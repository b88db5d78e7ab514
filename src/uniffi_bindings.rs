//! UniFFI bindings for recipe-muse
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! Parsing is exposed directly; generation wraps the async API with synchronous
//! functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::{ParsedRecipe, RecipeError};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible parsed recipe
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiParsedRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub tips: String,
}

impl From<ParsedRecipe> for FfiParsedRecipe {
    fn from(parsed: ParsedRecipe) -> Self {
        FfiParsedRecipe {
            title: parsed.title,
            ingredients: parsed.ingredients,
            instructions: parsed.instructions,
            tips: parsed.tips,
        }
    }
}

/// FFI-compatible generation result
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiGeneratedRecipe {
    /// Text as returned by the model
    pub raw: String,
    pub parsed: FfiParsedRecipe,
    pub cuisine: String,
    /// Photo as a `data:` URI, when one was generated
    pub image_data_uri: Option<String>,
}

/// FFI-compatible LLM provider enum
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiLlmProvider {
    Google,
    OpenAI,
    Anthropic,
}

impl From<FfiLlmProvider> for crate::Provider {
    fn from(provider: FfiLlmProvider) -> Self {
        match provider {
            FfiLlmProvider::Google => crate::Provider::Google,
            FfiLlmProvider::OpenAI => crate::Provider::OpenAI,
            FfiLlmProvider::Anthropic => crate::Provider::Anthropic,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiRecipeError {
    /// Request to a generation API failed
    RequestError { message: String },
    /// Provider answered with an error or without text
    ProviderError { message: String },
    /// Invalid input provided
    InvalidInput { message: String },
    /// Builder configuration error
    BuilderError { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiRecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiRecipeError::RequestError { message } => write!(f, "Request error: {}", message),
            FfiRecipeError::ProviderError { message } => write!(f, "Provider error: {}", message),
            FfiRecipeError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FfiRecipeError::BuilderError { message } => write!(f, "Builder error: {}", message),
            FfiRecipeError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            FfiRecipeError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiRecipeError {}

impl From<RecipeError> for FfiRecipeError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::InvalidInput(message) => FfiRecipeError::InvalidInput { message },
            RecipeError::BuilderError(message) => FfiRecipeError::BuilderError { message },
            e @ (RecipeError::Http(_) | RecipeError::Io(_)) => FfiRecipeError::RequestError {
                message: e.to_string(),
            },
            e @ (RecipeError::EnvError(_) | RecipeError::ConfigError(_)) => {
                FfiRecipeError::ConfigError {
                    message: e.to_string(),
                }
            }
            e => FfiRecipeError::ProviderError {
                message: e.to_string(),
            },
        }
    }
}

/// Configuration for generating recipes
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiGenerateConfig {
    /// Optional cuisine (uses the configured default if not specified)
    pub cuisine: Option<String>,
    /// Optional LLM provider (uses default if not specified)
    pub provider: Option<FfiLlmProvider>,
    /// Optional API key (uses environment variable if not specified)
    pub api_key: Option<String>,
    /// Optional model name (uses provider default if not specified)
    pub model: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
    /// If true, also wait for a photo of the dish
    pub with_image: bool,
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiRecipeError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiRecipeError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Parse generated recipe text into structured fields. Never fails.
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn parse_recipe_text(text: String) -> FfiParsedRecipe {
    crate::parse_recipe(&text).into()
}

/// Bare ingredient names of an ingredients block, capped at `limit` when given
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn extract_ingredient_names(ingredients: String, limit: Option<u32>) -> Vec<String> {
    crate::extract_ingredient_names(&ingredients, limit.map(|l| l as usize))
}

/// Photo prompt for a recipe title and its main ingredients
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn build_image_prompt(title: String, ingredients: Vec<String>) -> String {
    crate::build_image_prompt(&title, &ingredients)
}

/// Generate a recipe for the selected ingredients
///
/// # Arguments
/// * `ingredients` - Selected ingredient names
/// * `config` - Optional configuration for the generation
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn generate_recipe(
    ingredients: Vec<String>,
    config: Option<FfiGenerateConfig>,
) -> Result<FfiGeneratedRecipe, FfiRecipeError> {
    let rt = create_runtime()?;
    rt.block_on(async { generate_recipe_async(ingredients, config).await })
}

async fn generate_recipe_async(
    ingredients: Vec<String>,
    config: Option<FfiGenerateConfig>,
) -> Result<FfiGeneratedRecipe, FfiRecipeError> {
    let config = config.unwrap_or_default();

    let mut builder = crate::RecipeGenerator::builder()
        .ingredients(ingredients)
        .with_image(config.with_image);

    if let Some(cuisine) = config.cuisine {
        builder = builder.cuisine(cuisine);
    }

    if let Some(provider) = config.provider {
        builder = builder.provider(provider.into());
    }

    if let Some(api_key) = config.api_key {
        builder = builder.api_key(api_key);
    }

    if let Some(model) = config.model {
        builder = builder.model(model);
    }

    if let Some(timeout) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout));
    }

    let generator = builder.build()?;
    let (recipe, pending) = generator.generate_with_image().await?;
    let image = pending.wait().await;

    Ok(FfiGeneratedRecipe {
        raw: recipe.raw,
        parsed: recipe.parsed.into(),
        cuisine: recipe.cuisine,
        image_data_uri: image.map(|image| image.to_data_uri()),
    })
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if a provider has an API key in the environment
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn is_provider_available(provider: FfiLlmProvider) -> bool {
    match provider {
        FfiLlmProvider::Google => {
            std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("GOOGLE_API_KEY").is_ok()
        }
        FfiLlmProvider::OpenAI => std::env::var("OPENAI_API_KEY").is_ok(),
        FfiLlmProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_text_ffi() {
        let parsed = parse_recipe_text("**标题：** 番茄炒蛋\n**材料:**\n- 番茄".to_string());
        assert_eq!(parsed.title, "番茄炒蛋");
        assert_eq!(parsed.ingredients, "- 番茄");
        assert_eq!(parsed.tips, "");
    }

    #[test]
    fn test_extract_ingredient_names_ffi() {
        let names = extract_ingredient_names("- 盐\n- 糖\n- 油".to_string(), Some(2));
        assert_eq!(names, vec!["盐", "糖"]);
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_error_mapping() {
        let err: FfiRecipeError = RecipeError::InvalidInput("no ingredients".to_string()).into();
        assert!(matches!(err, FfiRecipeError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "Invalid input: no ingredients");
    }

    #[test]
    fn test_generate_without_ingredients_fails_fast() {
        let result = generate_recipe(Vec::new(), None);
        assert!(matches!(result, Err(FfiRecipeError::InvalidInput { .. })));
    }
}
