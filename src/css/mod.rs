//! CSS grammar events
//!
//! `cssparser` does the tokenizing; this module groups its tokens into the
//! coarse events the purge engine and the usage extractor walk: rulesets,
//! declarations, at-rules and comments, each with the raw text it came from.

mod grammar;

pub use grammar::{parse, GrammarEvent, GrammarKind, GrammarStream};

use thiserror::Error;

/// Errors produced while grouping a stylesheet into grammar events
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssError {
    #[error("CSS syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },
}

/// Strip a vendor prefix from an at-rule name: `-webkit-keyframes` -> `keyframes`
pub fn unprefixed(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix('-') {
        if let Some(index) = rest.find('-') {
            return &rest[index + 1..];
        }
    }
    name
}

/// True for `@keyframes` and its vendor-prefixed forms
pub fn is_keyframes(name: &str) -> bool {
    unprefixed(name).eq_ignore_ascii_case("keyframes")
}
