use thiserror::Error;

/// Errors that can occur while generating a recipe or its photo.
///
/// Parsing generated text never fails; these only cover the collaborators
/// around the parser (LLM calls, image calls, configuration, files).
#[derive(Error, Debug)]
pub enum RecipeError {
    /// HTTP request to a generation API failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A provider answered with an error or an unexpected payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// The text generation API answered without any text
    #[error("No text generated by {0}")]
    EmptyResponse(String),

    /// The image generation API did not return an image
    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    /// A data URI could not be split into header and payload
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Base64 payload of an image could not be decoded
    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Invalid input provided by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Reading or writing a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
