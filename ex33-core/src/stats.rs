//! Status-bar statistics and the one-click code tidy.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeStats {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
    /// UTF-8 size in KiB, one decimal.
    pub size_kb: String,
}

impl CodeStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
            size_kb: format!("{:.1}", text.len() as f64 / 1024.0),
        }
    }
}

fn tag_gap_regex() -> &'static Regex {
    static TAG_GAP_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_GAP_REGEX.get_or_init(|| Regex::new(r">\s*<").unwrap())
}

fn brace_regex() -> &'static Regex {
    static BRACE_REGEX: OnceLock<Regex> = OnceLock::new();
    BRACE_REGEX.get_or_init(|| Regex::new(r"([{}])").unwrap())
}

/// Puts every tag and every CSS brace on its own line, trims indentation and
/// drops blank lines. Deliberately naive: markup is treated as flat text.
pub fn beautify(text: &str) -> String {
    let split_tags = tag_gap_regex().replace_all(text, ">\n<");
    let split_braces = brace_regex().replace_all(&split_tags, "$1\n");

    split_braces
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
