//! Table of recognized section headings.
//!
//! Each section owns an ordered list of heading rules. When extracting a
//! section, the first rule (in table order) that occurs anywhere in the text
//! wins; lower-priority rules are not consulted after that. Adding a new
//! heading spelling is a matter of adding a row to [`HEADING_TABLE`].

use std::sync::LazyLock;

use regex::Regex;

/// Recipe sections the parser knows how to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Title,
    Ingredients,
    Instructions,
    Tips,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Title,
        Section::Ingredients,
        Section::Instructions,
        Section::Tips,
    ];

    /// The section whose heading closes this section's block. Ingredients
    /// run until the steps, steps until the tips; the title is a single line
    /// and tips run to the end of the text.
    pub const fn terminator(self) -> Option<Section> {
        match self {
            Section::Ingredients => Some(Section::Instructions),
            Section::Instructions => Some(Section::Tips),
            Section::Title | Section::Tips => None,
        }
    }
}

/// Whether a heading is wrapped in `**` markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    /// `**Label:**`
    Bold,
    /// `Label:`
    Plain,
}

/// Whether the colon after the label is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colon {
    Required,
    Optional,
}

/// A single heading spelling for a section.
#[derive(Debug, Clone, Copy)]
pub struct HeadingRule {
    pub section: Section,
    pub label: &'static str,
    pub style: HeadingStyle,
    pub colon: Colon,
}

impl HeadingRule {
    const fn new(section: Section, label: &'static str, style: HeadingStyle) -> Self {
        Self {
            section,
            label,
            style,
            colon: Colon::Required,
        }
    }

    const fn colon_optional(mut self) -> Self {
        self.colon = Colon::Optional;
        self
    }

    /// Regex source for this heading. Both the ASCII colon and the
    /// full-width colon are accepted.
    pub fn pattern(&self) -> String {
        let colon = match self.colon {
            Colon::Required => "[:：]",
            Colon::Optional => "[:：]?",
        };
        let label = regex::escape(self.label);
        match self.style {
            HeadingStyle::Bold => format!(r"\*\*{label}{colon}\*\*"),
            HeadingStyle::Plain => format!("{label}{colon}"),
        }
    }
}

use HeadingStyle::{Bold, Plain};

/// All heading rules, grouped by section, in priority order.
///
/// Bold spellings precede plain ones, Chinese labels precede English ones.
/// Tips is the exception: the English label is the primary tips heading and
/// `小贴士` is only consulted when no `Tips` heading exists.
pub const HEADING_TABLE: &[HeadingRule] = &[
    HeadingRule::new(Section::Title, "标题", Bold),
    HeadingRule::new(Section::Title, "标题", Plain),
    HeadingRule::new(Section::Ingredients, "材料", Bold),
    HeadingRule::new(Section::Ingredients, "材料", Plain),
    HeadingRule::new(Section::Ingredients, "Ingredients", Bold),
    HeadingRule::new(Section::Ingredients, "Ingredients", Plain),
    HeadingRule::new(Section::Instructions, "步骤", Bold),
    HeadingRule::new(Section::Instructions, "步骤", Plain),
    HeadingRule::new(Section::Instructions, "Method", Bold),
    HeadingRule::new(Section::Instructions, "Method", Plain),
    HeadingRule::new(Section::Tips, "Tips", Bold).colon_optional(),
    HeadingRule::new(Section::Tips, "Tips", Plain),
    HeadingRule::new(Section::Tips, "小贴士", Bold),
    HeadingRule::new(Section::Tips, "小贴士", Plain),
];

/// A heading rule with its compiled regex.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: HeadingRule,
    pub regex: Regex,
}

/// Location of a heading occurrence in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMatch {
    pub section: Section,
    pub start: usize,
    pub end: usize,
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    HEADING_TABLE
        .iter()
        .map(|rule| CompiledRule {
            rule: *rule,
            regex: Regex::new(&format!("(?i){}", rule.pattern()))
                .expect("Invalid heading regex"),
        })
        .collect()
});

/// One combined regex per section matching every heading of its
/// terminating section. Used to find where a section's block ends.
static BOUNDARIES: LazyLock<Vec<(Section, Regex)>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .filter_map(|&section| {
            let terminator = section.terminator()?;
            let alternatives: Vec<String> = HEADING_TABLE
                .iter()
                .filter(|rule| rule.section == terminator)
                .map(|rule| rule.pattern())
                .collect();
            let regex = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
                .expect("Invalid boundary regex");
            Some((section, regex))
        })
        .collect()
});

/// Find the heading for `section` following the table's priority order.
///
/// Returns the first occurrence of the highest-priority rule that occurs
/// anywhere in `text`.
pub fn find_heading(text: &str, section: Section) -> Option<HeadingMatch> {
    COMPILED_RULES
        .iter()
        .filter(|compiled| compiled.rule.section == section)
        .find_map(|compiled| {
            compiled.regex.find(text).map(|m| HeadingMatch {
                section,
                start: m.start(),
                end: m.end(),
            })
        })
}

/// Byte offset at which the block belonging to `section` ends, searching
/// from `from`: the start of the next heading of its terminating section,
/// or the end of the text.
pub fn block_end(text: &str, section: Section, from: usize) -> usize {
    let boundary = BOUNDARIES
        .iter()
        .find(|(s, _)| *s == section)
        .map(|(_, regex)| regex);

    match boundary {
        Some(regex) => regex
            .find_at(text, from)
            .map(|m| m.start())
            .unwrap_or(text.len()),
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_has_rules() {
        for section in Section::ALL {
            assert!(HEADING_TABLE.iter().any(|rule| rule.section == section));
        }
    }

    #[test]
    fn test_bold_pattern_accepts_both_colons() {
        let rule = HeadingRule::new(Section::Ingredients, "材料", Bold);
        let regex = Regex::new(&rule.pattern()).unwrap();
        assert!(regex.is_match("**材料:**"));
        assert!(regex.is_match("**材料：**"));
        assert!(!regex.is_match("材料:"));
    }

    #[test]
    fn test_english_headings_are_case_insensitive() {
        let found = find_heading("INGREDIENTS:\n- salt", Section::Ingredients).unwrap();
        assert_eq!(found.start, 0);

        let found = find_heading("**method：**\n1. boil", Section::Instructions).unwrap();
        assert_eq!(found.start, 0);
    }

    #[test]
    fn test_bold_rule_wins_over_earlier_plain_occurrence() {
        let text = "标题: 草稿\n**标题:** 正式";
        let found = find_heading(text, Section::Title).unwrap();
        assert_eq!(&text[found.start..found.end], "**标题:**");
    }

    #[test]
    fn test_bold_tips_colon_is_optional() {
        assert!(find_heading("**Tips**\n多放葱", Section::Tips).is_some());
        assert!(find_heading("some tips here", Section::Tips).is_none());
    }

    #[test]
    fn test_block_end_stops_at_other_section_heading() {
        let text = "**材料:**\n- 盐\n**步骤:**\n1. 炒";
        let heading = find_heading(text, Section::Ingredients).unwrap();
        let end = block_end(text, Section::Ingredients, heading.end);
        assert_eq!(&text[end..], "**步骤:**\n1. 炒");
    }

    #[test]
    fn test_block_end_ignores_non_terminating_headings() {
        let text = "**步骤:**\n1. 把材料：番茄切块\n2. 标题: 装盘\n**Tips:** 趁热";
        let heading = find_heading(text, Section::Instructions).unwrap();
        let end = block_end(text, Section::Instructions, heading.end);
        assert_eq!(&text[end..], "**Tips:** 趁热");
    }

    #[test]
    fn test_tips_block_runs_to_end() {
        let text = "Tips: 少放盐\n**步骤:**\n1. 炒";
        let heading = find_heading(text, Section::Tips).unwrap();
        assert_eq!(block_end(text, Section::Tips, heading.end), text.len());
    }

    #[test]
    fn test_block_end_ignores_same_section_heading() {
        let text = "**材料:**\n- 材料：见包装\n";
        let heading = find_heading(text, Section::Ingredients).unwrap();
        assert_eq!(block_end(text, Section::Ingredients, heading.end), text.len());
    }
}
