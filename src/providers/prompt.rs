/// Prompt sent to the text generation service.
///
/// The template is loaded from `recipe_prompt.txt` at compile time using the
/// `include_str!` macro. It asks for the heading layout that
/// [`parse_recipe`](crate::parse_recipe) understands; `{cuisine}` and
/// `{ingredients}` are substituted by [`build_recipe_prompt`].
pub const RECIPE_PROMPT_TEMPLATE: &str = include_str!("recipe_prompt.txt");

/// Cuisine styles offered to users. The first one is the default.
pub const CUISINES: [&str; 10] = [
    "中国菜",
    "法国菜",
    "意大利菜",
    "日本菜",
    "东南亚菜",
    "希腊菜",
    "美国菜",
    "墨西哥菜",
    "韩国菜",
    "印度菜",
];

/// Build the recipe generation prompt for the selected ingredients.
pub fn build_recipe_prompt<S: AsRef<str>>(ingredients: &[S], cuisine: &str) -> String {
    let ingredients = ingredients
        .iter()
        .map(|i| i.as_ref().trim())
        .filter(|i| !i.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    RECIPE_PROMPT_TEMPLATE
        .replace("{cuisine}", cuisine.trim())
        .replace("{ingredients}", &ingredients)
}

/// Build the photo prompt for a recipe, mentioning its main ingredients when
/// there are any.
pub fn build_image_prompt<S: AsRef<str>>(title: &str, ingredients: &[S]) -> String {
    let names: Vec<&str> = ingredients
        .iter()
        .map(|i| i.as_ref())
        .filter(|i| !i.is_empty())
        .collect();

    let dish = if names.is_empty() {
        format!("A delicious {} dish", title)
    } else {
        format!("A delicious {} dish made with {}", title, names.join(", "))
    };

    format!(
        "{}, professional food photography, appetizing presentation, warm lighting, high quality, 4K",
        dish
    )
}
