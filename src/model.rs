use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::RecipeError;
use crate::parser::extract_ingredient_names;

/// Title shown when the generated text carried no title heading.
pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

/// Structured fields recovered from generated recipe text.
/// Every field is an empty string when its heading was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub title: String,
    /// Raw ingredients block, one entry per line
    pub ingredients: String,
    /// Raw instructions block, typically numbered lines
    pub instructions: String,
    pub tips: String,
}

impl ParsedRecipe {
    /// Title for display, falling back to [`UNTITLED_RECIPE`].
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_RECIPE
        } else {
            &self.title
        }
    }

    /// Bare ingredient names of the ingredients block, in document order.
    pub fn ingredient_names(&self, limit: Option<usize>) -> Vec<String> {
        extract_ingredient_names(&self.ingredients, limit)
    }

    /// True when nothing at all could be recovered from the text.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.ingredients.is_empty()
            && self.instructions.is_empty()
            && self.tips.is_empty()
    }
}

/// Binary image returned by the image generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// Render as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Decode a base64 data URI.
    ///
    /// The mime type defaults to `application/octet-stream` when the header
    /// does not name one.
    pub fn from_data_uri(uri: &str) -> Result<Self, RecipeError> {
        let (header, payload) = uri
            .split_once(',')
            .ok_or_else(|| RecipeError::InvalidDataUri("missing ',' separator".to_string()))?;

        let mime_type = header
            .split_once(':')
            .and_then(|(_, rest)| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .filter(|mime| !mime.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = STANDARD.decode(payload.trim())?;
        Ok(GeneratedImage { bytes, mime_type })
    }

    /// File extension matching the mime type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Recipe as handed to the persistence service when a user favorites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub title: String,
    /// Ingredient names, e.g. `["盐", "糖"]`
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    pub user_id: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

impl RecipeRecord {
    pub fn from_parsed(
        parsed: &ParsedRecipe,
        cuisine: Option<&str>,
        user_id: impl Into<String>,
        created_at: i64,
    ) -> Self {
        RecipeRecord {
            title: parsed.display_title().to_string(),
            ingredients: parsed.ingredient_names(None),
            instructions: parsed.instructions.clone(),
            tips: Some(parsed.tips.clone()).filter(|tips| !tips.is_empty()),
            cuisine: cuisine.map(str::to_string),
            user_id: user_id.into(),
            created_at,
        }
    }

    /// Storage path under which the recipe photo is uploaded.
    pub fn image_path(&self, recipe_id: &str, timestamp: i64) -> String {
        format!("{}/recipes/{}_{}.png", self.user_id, recipe_id, timestamp)
    }
}
