use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use recipe_muse::{
    extract_ingredient_names, parse_recipe, surprise_selection, GeneratedImage, GeneratedRecipe,
    PantryItem, PendingImage, Provider, RecipeGenerator,
};

#[derive(Parser)]
#[command(name = "recipe-muse")]
#[command(about = "Generate home-cooking recipes from the ingredients you have")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe for the selected ingredients
    Generate {
        /// Selected ingredient (repeat or separate with commas)
        #[arg(short, long = "ingredient", required = true, value_delimiter = ',')]
        ingredients: Vec<String>,
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Pick random ingredients from a pantry file and generate a recipe
    Surprise {
        /// JSON file with `[{"name": ..., "category": ...}]` entries
        #[arg(long)]
        pantry: PathBuf,
        #[command(flatten)]
        options: GenerateOptions,
    },
    /// Parse generated recipe text (stdin when no file is given) and print JSON
    Parse {
        file: Option<PathBuf>,
    },
    /// Print the ingredient names of a recipe's ingredients section
    Ingredients {
        file: Option<PathBuf>,
        /// Only print the first N names
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(clap::Args)]
struct GenerateOptions {
    /// Cuisine style, e.g. 中国菜 or 意大利菜
    #[arg(short, long)]
    cuisine: Option<String>,
    /// Text provider (google, openai, anthropic)
    #[arg(long)]
    provider: Option<String>,
    /// Model name for the text provider
    #[arg(long)]
    model: Option<String>,
    /// Write a photo of the dish to this path
    #[arg(long)]
    image: Option<PathBuf>,
    /// Print the record handed to storage as JSON instead of text
    #[arg(long)]
    json: bool,
    /// User id stored in the JSON record
    #[arg(long, default_value = "local")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            ingredients,
            options,
        } => generate(ingredients, None, options).await?,
        Commands::Surprise { pantry, options } => {
            let content = tokio::fs::read_to_string(&pantry).await?;
            let items: Vec<PantryItem> = serde_json::from_str(&content)?;
            let pick = surprise_selection(&items, &mut rand::thread_rng())
                .ok_or("Pantry is empty, add some ingredients first")?;
            info!("Surprise pick: {:?} ({})", pick.ingredients, pick.cuisine);
            generate(pick.ingredients, Some(pick.cuisine), options).await?;
        }
        Commands::Parse { file } => {
            let text = read_input(file.as_deref()).await?;
            let parsed = parse_recipe(&text);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Commands::Ingredients { file, limit } => {
            let text = read_input(file.as_deref()).await?;
            let parsed = parse_recipe(&text);
            // Fall back to treating the whole input as an ingredients block
            let block = if parsed.ingredients.is_empty() {
                text.as_str()
            } else {
                parsed.ingredients.as_str()
            };
            for name in extract_ingredient_names(block, limit) {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

async fn generate(
    ingredients: Vec<String>,
    cuisine: Option<String>,
    options: GenerateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = RecipeGenerator::builder()
        .ingredients(ingredients)
        .with_image(options.image.is_some());

    if let Some(cuisine) = options.cuisine.or(cuisine) {
        builder = builder.cuisine(cuisine);
    }
    if let Some(name) = options.provider {
        let provider =
            Provider::from_name(&name).ok_or_else(|| format!("Unknown provider: {}", name))?;
        builder = builder.provider(provider);
    }
    if let Some(model) = options.model {
        builder = builder.model(model);
    }

    let generator = builder.build()?;
    let (recipe, pending) = generator.generate_with_image().await?;

    // The recipe is shown before the photo is awaited
    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recipe.to_record(options.user.as_str()))?
        );
    } else {
        print_recipe(&recipe);
    }

    if let Some(path) = options.image {
        save_image(pending, &path).await?;
    }

    Ok(())
}

fn print_recipe(recipe: &GeneratedRecipe) {
    let parsed = &recipe.parsed;
    println!("# {} ({})\n", parsed.display_title(), recipe.cuisine);

    if parsed.is_empty() {
        // Nothing recognizable, show what the model wrote
        println!("{}", recipe.raw);
        return;
    }

    println!("## 材料\n{}\n", parsed.ingredients);
    println!("## 步骤\n{}", parsed.instructions);
    if !parsed.tips.is_empty() {
        println!("\n## 小贴士\n{}", parsed.tips);
    }
}

async fn save_image(pending: PendingImage, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match pending.wait().await {
        Some(image) => {
            write_image(&image, path).await?;
            eprintln!("Photo saved to {}", path.display());
        }
        None => warn!("No photo was generated; the recipe above is still complete"),
    }
    Ok(())
}

async fn write_image(image: &GeneratedImage, path: &Path) -> Result<(), std::io::Error> {
    let path = if path.extension().is_none() {
        path.with_extension(image.extension())
    } else {
        path.to_path_buf()
    };
    tokio::fs::write(path, &image.bytes).await
}

async fn read_input(file: Option<&Path>) -> Result<String, std::io::Error> {
    match file {
        Some(path) => tokio::fs::read_to_string(path).await,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
    }
}
