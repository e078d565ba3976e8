//! Text analysis for chat messages.
//!
//! A deliberately small token pipeline shared by the scorers: a tokenizer
//! splits text into [`Token`]s, filters normalize or drop them, and an
//! [`Analyzer`] bundles both behind one call.
//!
//! ```text
//! Raw message → Tokenizer → Lowercase → Stop words → Tokens
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::{Analyzer, SimpleAnalyzer, StandardAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
