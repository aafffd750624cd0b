//! Intent engine - scoring, response selection and confidence labels

pub mod classifier;
pub mod intent_matcher;
pub mod responses;

pub use classifier::{Chatbot, ClassificationResult, Confidence};
pub use intent_matcher::{IntentMatcher, MatchResult};
