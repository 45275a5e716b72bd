//! Token parsers for argument nodes.
//!
//! A [`ValueParser`] decides whether an argument node accepts a token, and
//! names the value family it parses. The family is what merge
//! compatibility is judged on: two argument nodes with the same name merge
//! only when their parsers report the same family.

use std::sync::Arc;

/// Accepts or rejects single tokens for an argument node.
pub trait ValueParser: Send + Sync {
    /// Stable name of the value family this parser accepts, e.g. `"word"`
    /// or `"integer"`. Same-named argument nodes with different families
    /// refuse to merge.
    fn family(&self) -> &str;

    /// Try to consume `token`. Returns the normalized textual value, or
    /// `None` when the token is rejected.
    fn parse(&self, token: &str) -> Option<String>;
}

/// Accepts any single token verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct Word;

impl ValueParser for Word {
    fn family(&self) -> &str {
        "word"
    }

    fn parse(&self, token: &str) -> Option<String> {
        Some(token.to_string())
    }
}

/// Accepts base-10 signed integers, normalized (no leading zeros or `+`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Integer;

impl ValueParser for Integer {
    fn family(&self) -> &str {
        "integer"
    }

    fn parse(&self, token: &str) -> Option<String> {
        token.parse::<i64>().ok().map(|v| v.to_string())
    }
}

/// Shared handle to the [`Word`] parser.
pub fn word() -> Arc<dyn ValueParser> {
    Arc::new(Word)
}

/// Shared handle to the [`Integer`] parser.
pub fn integer() -> Arc<dyn ValueParser> {
    Arc::new(Integer)
}
