//! Rule-based noun lemmatizer
//!
//! Reduces plural nouns to their singular base form. Irregular forms come
//! from a fixed table; everything else goes through a short list of suffix
//! rules. Words that are not plurals come back unchanged. The rules only
//! look at spelling, so a singular ending in `s` that is missing from the
//! table can still be clipped (`cosmos` -> `cosmo`); patterns and input go
//! through the same rules, so matching is unaffected.

use lazy_static::lazy_static;
use std::borrow::Cow;
use std::collections::HashMap;

lazy_static! {
    static ref IRREGULAR: HashMap<&'static str, &'static str> = [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("people", "people"),
        ("data", "data"),
        ("criteria", "criterion"),
        ("analyses", "analysis"),
        ("crises", "crisis"),
        ("thanks", "thanks"),
        ("news", "news"),
        ("series", "series"),
        ("species", "species"),
        ("yes", "yes"),
        ("gas", "gas"),
        ("bus", "bus"),
        ("buses", "bus"),
        ("gases", "gas"),
        ("lies", "lie"),
        ("ties", "tie"),
        ("pies", "pie"),
        ("dies", "die"),
        ("chaos", "chaos"),
        ("lens", "lens"),
        ("canvas", "canvas"),
        ("atlas", "atlas"),
        ("bias", "bias"),
        ("alias", "alias"),
    ]
    .into_iter()
    .collect();
}

/// Shortest word the suffix rules will touch.
const MIN_RULE_LEN: usize = 4;

#[derive(Debug, Default, Clone, Copy)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Self
    }

    /// Expects a lowercased token.
    pub fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if let Some(base) = IRREGULAR.get(word) {
            return Cow::Borrowed(base);
        }
        if word.chars().count() < MIN_RULE_LEN || !word.ends_with('s') {
            return Cow::Borrowed(word);
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return Cow::Borrowed(word);
        }

        if let Some(stem) = word.strip_suffix("ies") {
            return Cow::Owned(format!("{}y", stem));
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return Cow::Borrowed(&word[..word.len() - 2]);
            }
        }

        Cow::Borrowed(&word[..word.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        Lemmatizer::new().lemmatize(word).into_owned()
    }

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemma("hours"), "hour");
        assert_eq!(lemma("credentials"), "credential");
        assert_eq!(lemma("deliveries"), "delivery");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("glitches"), "glitch");
        assert_eq!(lemma("crashes"), "crash");
    }

    #[test]
    fn test_words_left_alone() {
        assert_eq!(lemma("business"), "business");
        assert_eq!(lemma("status"), "status");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("shipping"), "shipping");
        assert_eq!(lemma("cost"), "cost");
        assert_eq!(lemma("its"), "its");
    }

    #[test]
    fn test_irregular_forms() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("men"), "man");
        assert_eq!(lemma("thanks"), "thanks");
        assert_eq!(lemma("news"), "news");
    }

    #[test]
    fn test_suffix_rule_exceptions() {
        assert_eq!(lemma("lies"), "lie");
        assert_eq!(lemma("ties"), "tie");
        assert_eq!(lemma("buses"), "bus");
        assert_eq!(lemma("chaos"), "chaos");
        assert_eq!(lemma("canvas"), "canvas");
        assert_eq!(lemma("parties"), "party");
    }

    #[test]
    fn test_non_ascii_input_is_safe() {
        assert_eq!(lemma("cafés"), "café");
        assert_eq!(lemma("日本"), "日本");
    }
}
