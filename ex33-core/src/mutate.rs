//! Scoped, literal edits of the source text.
//!
//! Search terms are always literal text. Where a pattern is needed (media
//! removal) the user-supplied value goes through [`regex::escape`] first.

use crate::error::Ex33Result;
use regex::{NoExpand, RegexBuilder};

/// Replaces every literal occurrence of `find` with `replace`.
/// Empty `find` leaves the text untouched.
pub fn replace_all_literal(text: &str, find: &str, replace: &str) -> String {
    if find.is_empty() {
        return text.to_string();
    }
    text.replace(find, replace)
}

/// Removes every literal occurrence of `token` (emoji or URL deletion).
pub fn remove_occurrence(text: &str, token: &str) -> String {
    replace_all_literal(text, token, "")
}

/// Substitutes `new_val` for every literal `old_val`.
///
/// An empty replacement or one equal to the original is a no-op, so clearing
/// the replace box never wipes content.
pub fn replace_occurrence(text: &str, old_val: &str, new_val: &str) -> String {
    if new_val.is_empty() || old_val == new_val {
        return text.to_string();
    }
    replace_all_literal(text, old_val, new_val)
}

/// Removes a media reference from markup and styles.
///
/// In order: `<img>` tags whose `src` is the URL are dropped, CSS
/// `url(...)` references become `none`, and any other ` attr="url"` attribute
/// is stripped. Matching is case-insensitive on the surrounding syntax.
pub fn remove_media(text: &str, url: &str) -> Ex33Result<String> {
    if url.is_empty() {
        return Ok(text.to_string());
    }
    let escaped = regex::escape(url);

    let img_tag = RegexBuilder::new(&format!(r#"<img[^>]*src=["']{}["'][^>]*>"#, escaped))
        .case_insensitive(true)
        .build()?;
    let css_url = RegexBuilder::new(&format!(r#"url\(['"]?{}['"]?\)"#, escaped))
        .case_insensitive(true)
        .build()?;
    let generic_attr = RegexBuilder::new(&format!(r#"\s[a-z-]+=["']{}["']"#, escaped))
        .case_insensitive(true)
        .build()?;

    let without_tags = img_tag.replace_all(text, NoExpand(""));
    let without_css = css_url.replace_all(&without_tags, NoExpand("none"));
    let without_attrs = generic_attr.replace_all(&without_css, NoExpand(""));

    Ok(without_attrs.into_owned())
}
