//! Text normalization - tokenization, stopword removal and lemmatization

pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;

pub use lemmatizer::Lemmatizer;
pub use normalizer::TextNormalizer;
