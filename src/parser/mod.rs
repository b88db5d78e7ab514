//! Recovery of structured recipe fields from generated text.
//!
//! Generated recipes loosely follow a heading convention (`**标题：**`,
//! `**材料:**`, `**步骤:**`, `Tips:` and English equivalents). Parsing is
//! total: any heading that cannot be found yields an empty field.

pub mod headings;
mod ingredients;

pub use headings::Section;
pub use ingredients::extract_ingredient_names;

use log::debug;

use crate::model::ParsedRecipe;
use headings::{block_end, find_heading};

/// Parse generated recipe text into its title, ingredients, instructions
/// and tips.
///
/// # Example
/// ```
/// use recipe_muse::parse_recipe;
///
/// let parsed = parse_recipe("**标题：** 番茄炒蛋\n**材料:**\n- 番茄\n- 鸡蛋");
/// assert_eq!(parsed.title, "番茄炒蛋");
/// assert_eq!(parsed.ingredients, "- 番茄\n- 鸡蛋");
/// assert_eq!(parsed.instructions, "");
/// ```
pub fn parse_recipe(text: &str) -> ParsedRecipe {
    debug!("Raw recipe text: {:?}", text);

    let parsed = ParsedRecipe {
        title: extract_title(text),
        ingredients: extract_block(text, Section::Ingredients),
        instructions: extract_block(text, Section::Instructions),
        tips: extract_block(text, Section::Tips),
    };

    debug!("Parsed recipe: {:?}", parsed);
    parsed
}

/// The rest of the title heading's line. Whitespace right after the heading
/// is skipped, so a title on the following line is still picked up.
fn extract_title(text: &str) -> String {
    let Some(heading) = find_heading(text, Section::Title) else {
        return String::new();
    };

    text[heading.end..]
        .trim_start()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Everything between the section heading and the next heading of the
/// section that closes it (or the end of the text), trimmed.
fn extract_block(text: &str, section: Section) -> String {
    let Some(heading) = find_heading(text, section) else {
        return String::new();
    };

    let end = block_end(text, section, heading.end);
    text[heading.end..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_recipe(""), ParsedRecipe::default());
    }

    #[test]
    fn test_text_without_headings() {
        let parsed = parse_recipe("Just boil some water and add noodles.");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_title_on_next_line() {
        let parsed = parse_recipe("**标题：**\n红烧肉\n**材料:**\n- 五花肉");
        assert_eq!(parsed.title, "红烧肉");
    }

    #[test]
    fn test_title_heading_at_end_of_text() {
        let parsed = parse_recipe("**标题：**");
        assert_eq!(parsed.title, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = parse_recipe("**标题：** 凉拌黄瓜\r\n**材料:**\r\n- 黄瓜\r\n**步骤:**\r\n1. 拍黄瓜");
        assert_eq!(parsed.title, "凉拌黄瓜");
        assert_eq!(parsed.ingredients, "- 黄瓜");
        assert_eq!(parsed.instructions, "1. 拍黄瓜");
    }

    #[test]
    fn test_tips_heading_inside_step_ends_block() {
        // A step mentioning a heading word cuts the block short.
        let parsed = parse_recipe("**步骤:**\n1. 看 Tips: 部分\n2. 装盘");
        assert_eq!(parsed.instructions, "1. 看");
        assert_eq!(parsed.tips, "部分\n2. 装盘");
    }

    #[test]
    fn test_out_of_order_sections() {
        let text = "Tips: 趁热吃\n**步骤:**\n1. 煮面\n**材料:**\n- 面条";
        let parsed = parse_recipe(text);
        assert_eq!(parsed.tips, "趁热吃\n**步骤:**\n1. 煮面\n**材料:**\n- 面条");
        assert_eq!(parsed.instructions, "1. 煮面\n**材料:**\n- 面条");
        assert_eq!(parsed.ingredients, "- 面条");
    }

    #[test]
    fn test_step_mentioning_ingredients_heading() {
        let text = "**标题：** 番茄炒蛋\n**材料:**\n- 番茄\n**步骤:**\n1. 把材料：番茄切块\n2. 炒熟";
        let parsed = parse_recipe(text);
        assert_eq!(parsed.ingredients, "- 番茄");
        assert_eq!(parsed.instructions, "1. 把材料：番茄切块\n2. 炒熟");
    }
}
