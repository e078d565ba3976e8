//! Token types for text analysis.
//!
//! A [`Token`] carries the normalized text of one word together with its
//! position and byte offsets in the original message, so scorers can both
//! count words and point back at the text that triggered a rule.
//!
//! # Examples
//!
//! ```
//! use chatscore::analysis::token::Token;
//!
//! let token = Token::with_offsets("refund", 2, 10, 16);
//! assert_eq!(token.text, "refund");
//! assert_eq!(token.len(), 6);
//! assert!(!token.is_stopped());
//! ```

use serde::{Deserialize, Serialize};

/// A single unit of text produced by a tokenizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped by a filter
    pub stopped: bool,
}

/// A stream of tokens flowing through the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let end_offset = text.len();
        Token {
            text,
            position,
            start_offset: 0,
            end_offset,
            stopped: false,
        }
    }

    /// Create a new token with explicit byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    /// Replace the token text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check whether the token was stopped by a filter.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Length of the token text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check whether the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 3);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 3);
        assert_eq!(token.end_offset, 5);
        assert!(!token.is_stopped());
    }

    #[test]
    fn test_token_builders() {
        let token = Token::with_offsets("Hello", 0, 4, 9)
            .with_text("hello")
            .stop();
        assert_eq!(token.text, "hello");
        assert_eq!(token.start_offset, 4);
        assert!(token.is_stopped());
    }

    #[test]
    fn test_token_len_counts_chars() {
        assert_eq!(Token::new("café", 0).len(), 4);
        assert!(Token::new("", 0).is_empty());
    }
}
