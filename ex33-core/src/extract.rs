//! Content extraction: media references, emoji glyphs and hex color swatches.
//!
//! Markup is scanned as flat text. Every function here is total and runs in
//! linear time (the `regex` crate never backtracks).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Maximum number of color swatches reported.
pub const MAX_COLORS: usize = 8;

/// URLs shorter than this are treated as noise (`#`, `a.png`, ...).
const MIN_URL_LEN: usize = 6;

/// The three derived hint lists for a snapshot of the source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub media: Vec<String>,
    pub emoji: Vec<String>,
    pub colors: Vec<String>,
}

impl Extraction {
    pub fn from_text(text: &str) -> Self {
        Self {
            media: extract_media_urls(text),
            emoji: extract_emoji(text),
            colors: extract_hex_colors(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty() && self.emoji.is_empty() && self.colors.is_empty()
    }
}

/// Ordered set: keeps first occurrence, drops later duplicates.
#[derive(Default)]
struct FirstSeen {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl FirstSeen {
    fn push(&mut self, value: &str) {
        if self.seen.insert(value.to_string()) {
            self.items.push(value.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

fn media_regex() -> &'static Regex {
    static MEDIA_REGEX: OnceLock<Regex> = OnceLock::new();
    MEDIA_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)src\s*=\s*["']([^"']+)["']|srcset\s*=\s*["']([^"']+)["']|url\(\s*["']?([^"')]+)["']?\s*\)"#,
        )
        .unwrap()
    })
}

fn hex_color_regex() -> &'static Regex {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    HEX_COLOR_REGEX.get_or_init(|| Regex::new(r"#(?:[0-9a-fA-F]{3}){1,2}(?-u:\b)").unwrap())
}

fn is_media_candidate(url: &str) -> bool {
    url.chars().count() >= MIN_URL_LEN && !url.starts_with("data:")
}

/// Extracts media references from `src="..."`, `srcset="..."` and CSS `url(...)`.
///
/// `srcset` lists are split on commas and only the URL before the width or
/// density descriptor is kept. Results are unique, in order of first appearance.
pub fn extract_media_urls(text: &str) -> Vec<String> {
    let mut urls = FirstSeen::default();

    for caps in media_regex().captures_iter(text) {
        if let Some(src) = caps.get(1) {
            let url = src.as_str().trim();
            if is_media_candidate(url) {
                urls.push(url);
            }
        } else if let Some(srcset) = caps.get(2) {
            for candidate in srcset.as_str().split(',') {
                if let Some(url) = candidate.split_whitespace().next() {
                    if is_media_candidate(url) {
                        urls.push(url);
                    }
                }
            }
        } else if let Some(css_url) = caps.get(3) {
            let url = css_url.as_str().trim();
            if is_media_candidate(url) {
                urls.push(url);
            }
        }
    }

    urls.into_vec()
}

/// Broad symbol/pictograph heuristic: copyright, registered, the general
/// punctuation through CJK symbols blocks, and the astral pictograph planes.
fn is_pictograph(c: char) -> bool {
    matches!(
        c,
        '\u{00A9}' | '\u{00AE}' | '\u{2000}'..='\u{3300}' | '\u{1F000}'..='\u{1FBFF}'
    )
}

/// Extracts single-code-point glyphs that look like emoji.
///
/// Whitespace code points inside the ranges (en quad, ideographic space, ...)
/// are skipped. Unique by code point, in order of first appearance.
pub fn extract_emoji(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut glyphs = Vec::new();

    for c in text.chars() {
        if is_pictograph(c) && !c.is_whitespace() && seen.insert(c) {
            glyphs.push(c.to_string());
        }
    }

    glyphs
}

/// Extracts `#rgb` / `#rrggbb` literals, unique, capped at [`MAX_COLORS`].
pub fn extract_hex_colors(text: &str) -> Vec<String> {
    let mut colors = FirstSeen::default();

    for m in hex_color_regex().find_iter(text) {
        colors.push(m.as_str());
        if colors.items.len() == MAX_COLORS {
            break;
        }
    }

    colors.into_vec()
}
