use crate::config::{ImageConfig, ProviderConfig};
use crate::error::RecipeError;
use crate::model::GeneratedImage;
use crate::providers::{ensure_success, http_client, resolve_api_key, ImageProvider, LlmProvider};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Google Gemini text generation
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, RecipeError> {
        // Try config first, then fall back to environment variables
        let api_key = resolve_api_key(config.api_key.as_deref(), &API_KEY_VARS)?;

        Ok(GoogleProvider {
            client: http_client(config.timeout())?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

fn generate_content_url(base_url: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        base_url.trim_end_matches('/'),
        model,
        api_key
    )
}

/// Parts of the first candidate in a `generateContent` response.
fn candidate_parts(response_body: &Value) -> &[Value] {
    response_body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RecipeError> {
        let url = generate_content_url(&self.base_url, &self.model, &self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens
                }
            }))
            .send()
            .await?;

        let response = ensure_success(self.provider_name(), response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text: String = candidate_parts(&response_body)
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(RecipeError::EmptyResponse(self.provider_name().to_string()));
        }

        Ok(text)
    }
}

/// Google Gemini image generation
pub struct GoogleImageProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GoogleImageProvider {
    pub fn new(config: &ImageConfig, timeout: Option<Duration>) -> Result<Self, RecipeError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), &API_KEY_VARS)?;

        Ok(GoogleImageProvider {
            client: http_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ImageProvider for GoogleImageProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, RecipeError> {
        let url = generate_content_url(&self.base_url, &self.model, &self.api_key);
        debug!("Requesting image from {} with prompt: {}", self.model, prompt);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt }]
                }],
                "generationConfig": {
                    "responseModalities": ["TEXT", "IMAGE"]
                }
            }))
            .send()
            .await?;

        let response = ensure_success(self.provider_name(), response).await?;
        let response_body: Value = response.json().await?;

        // The first part carrying inline data is the image; text parts are commentary.
        let inline = candidate_parts(&response_body)
            .iter()
            .find_map(|part| {
                let inline = part.get("inlineData")?;
                let data = inline["data"].as_str()?;
                let mime_type = inline["mimeType"].as_str().unwrap_or("image/png");
                Some((data, mime_type))
            })
            .ok_or_else(|| {
                RecipeError::ImageGeneration("response contained no inline image data".to_string())
            })?;

        let (data, mime_type) = inline;
        let bytes = STANDARD.decode(data)?;
        debug!("Received {} byte {} image", bytes.len(), mime_type);

        Ok(GeneratedImage {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }
}
