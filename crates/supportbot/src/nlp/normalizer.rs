//! Canonical token sequences for intent matching

use crate::nlp::lemmatizer::Lemmatizer;
use crate::nlp::stopwords;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref CLITIC_REGEX: Regex = Regex::new(r"^(.+?)(n't|'s|'re|'ve|'ll|'d|'m)$").unwrap();
}

const NEGATION_CLITIC: &str = "n't";

/// Negated modals whose stem does not survive a plain `n't` split.
const IRREGULAR_NEGATIONS: [(&str, &str); 3] = [("can't", "can"), ("won't", "will"), ("shan't", "shall")];

/// Turns raw text into lowercase, lemmatized, stopword-free tokens.
///
/// Built once at start-up and shared read-only; the matcher normalizes its
/// patterns with the same instance so both sides agree on token forms.
#[derive(Debug, Default, Clone)]
pub struct TextNormalizer {
    lemmatizer: Lemmatizer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            lemmatizer: Lemmatizer::new(),
        }
    }

    /// Left-to-right order is kept and duplicates survive. An empty result is
    /// a normal outcome (all punctuation, all stopwords, blank input).
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        lowered
            .unicode_words()
            .flat_map(Self::split_clitic)
            .flatten()
            .filter(|token| Self::is_content_token(token))
            .map(|token| self.lemmatizer.lemmatize(token).into_owned())
            .collect()
    }

    /// Splits a contraction into its stem and clitic, both kept as tokens
    /// (`what's` -> `what`, `'s`). Stopword filtering applies to each part.
    fn split_clitic(word: &str) -> [Option<&str>; 2] {
        if let Some((_, stem)) = IRREGULAR_NEGATIONS.iter().find(|(form, _)| *form == word) {
            return [Some(stem), Some(NEGATION_CLITIC)];
        }
        match CLITIC_REGEX.captures(word) {
            Some(caps) => [caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str())],
            None => [Some(word), None],
        }
    }

    fn is_content_token(token: &str) -> bool {
        token.chars().any(char::is_alphanumeric) && !stopwords::is_stop_word(token)
    }
}
