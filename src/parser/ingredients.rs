const BULLETS: [char; 3] = ['-', '*', '•'];

/// Reduce an ingredients block to bare ingredient names.
///
/// Only lines that look like list items are kept: a bullet (`-`, `*`, `•`)
/// or an ordinal such as `1.`. The first `limit` items are taken in document
/// order, then the marker and surrounding whitespace are stripped. Lines
/// like `(to taste)` are dropped.
pub fn extract_ingredient_names(block: &str, limit: Option<usize>) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| strip_marker(line).is_some())
        .take(limit.unwrap_or(usize::MAX))
        .filter_map(strip_marker)
        .map(|name| name.trim().to_string())
        .collect()
}

/// The text after a leading bullet or ordinal marker, if the line has one.
fn strip_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix(BULLETS) {
        return Some(rest);
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_unmarked_lines() {
        let block = "- 盐\n  (note: to taste)\n- 糖\n1. 油";
        assert_eq!(extract_ingredient_names(block, None), vec!["盐", "糖", "油"]);
    }

    #[test]
    fn test_limit_keeps_document_order() {
        let block = "- 盐\n  (note: to taste)\n- 糖\n1. 油";
        assert_eq!(extract_ingredient_names(block, Some(2)), vec!["盐", "糖"]);
    }

    #[test]
    fn test_all_marker_kinds() {
        let block = "* 葱\n• 姜\n12. 蒜\n  - 辣椒  ";
        assert_eq!(
            extract_ingredient_names(block, None),
            vec!["葱", "姜", "蒜", "辣椒"]
        );
    }

    #[test]
    fn test_number_without_period_is_not_a_marker() {
        assert!(extract_ingredient_names("2 eggs\n300g flour", None).is_empty());
    }

    #[test]
    fn test_empty_block() {
        assert!(extract_ingredient_names("", Some(5)).is_empty());
        assert!(extract_ingredient_names("", None).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        assert!(extract_ingredient_names("- 盐", Some(0)).is_empty());
    }

    #[test]
    fn test_keeps_duplicates() {
        assert_eq!(
            extract_ingredient_names("- 盐\n- 盐", None),
            vec!["盐", "盐"]
        );
    }
}
