//! Recipe generation from pantry ingredients.
//!
//! A text generation service writes a recipe in a loosely templated layout,
//! [`parse_recipe`] recovers its title, ingredients, instructions and tips,
//! and an image generation service paints a matching photo.

pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod pantry;
pub mod parser;
pub mod providers;

// UniFFI bindings module
pub mod uniffi_bindings;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::RecipeError;
pub use generator::{GeneratedRecipe, PendingImage, Provider, RecipeGenerator, RecipeGeneratorBuilder};
pub use model::{GeneratedImage, ParsedRecipe, RecipeRecord};
pub use pantry::{surprise_selection, PantryItem, SurprisePick};
pub use parser::{extract_ingredient_names, parse_recipe};
pub use providers::{build_image_prompt, build_recipe_prompt, CUISINES};

/// Generate and parse a recipe for the given ingredients using the
/// configured default provider, without a photo.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), recipe_muse::RecipeError> {
/// let recipe = recipe_muse::generate_recipe(&["番茄", "鸡蛋"], Some("中国菜")).await?;
/// println!("{}", recipe.parsed.display_title());
/// # Ok(())
/// # }
/// ```
pub async fn generate_recipe<S: AsRef<str>>(
    ingredients: &[S],
    cuisine: Option<&str>,
) -> Result<GeneratedRecipe, RecipeError> {
    let mut builder = RecipeGenerator::builder()
        .ingredients(ingredients.iter().map(|i| i.as_ref().to_string()))
        .with_image(false);
    if let Some(cuisine) = cuisine {
        builder = builder.cuisine(cuisine);
    }

    builder.build()?.generate().await
}
