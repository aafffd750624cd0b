//! Text helpers for log lines and terminal output

use std::borrow::Cow;
use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

pub struct TextUtils;

impl TextUtils {
    /// Collapse runs of whitespace (newlines included) into single spaces
    pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
        if text.contains(|c: char| c.is_whitespace() && c != ' ') || text.contains("  ") || text != text.trim() {
            Cow::Owned(WHITESPACE_REGEX.replace_all(text, " ").trim().to_string())
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Truncate to at most `max_chars` characters, ending with "..." when cut
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> Cow<'_, str> {
        if text.chars().count() <= max_chars {
            return Cow::Borrowed(text);
        }
        if max_chars <= 3 {
            return Cow::Borrowed("...");
        }

        let mut result: String = text.chars().take(max_chars - 3).collect();
        result.push_str("...");
        Cow::Owned(result)
    }

    /// Single-line preview of a chat message
    pub fn preview(text: &str, max_chars: usize) -> String {
        let flat = Self::normalize_whitespace(text);
        Self::truncate_with_ellipsis(&flat, max_chars).into_owned()
    }
}
