//! Utilities module - small text helpers shared by logging call sites

pub mod text_utils;

pub use text_utils::TextUtils;
