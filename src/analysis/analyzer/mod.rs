//! Analyzers combine a tokenizer with a chain of filters.
//!
//! - [`StandardAnalyzer`] - Unicode words, lowercase, stop words removed
//! - [`SimpleAnalyzer`] - Unicode words, lowercase, nothing removed
//! - [`PipelineAnalyzer`] - Custom tokenizer + filter chain
//!
//! # Examples
//!
//! ```
//! use chatscore::analysis::analyzer::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new();
//! let terms = analyzer.terms("Where is my REFUND?").unwrap();
//! assert_eq!(terms, vec!["where", "refund"]);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod pipeline;
pub mod simple;
pub mod standard;

pub use pipeline::PipelineAnalyzer;
pub use simple::SimpleAnalyzer;
pub use standard::StandardAnalyzer;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Analyze the text and collect the token texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}
