//! # chatscore
//!
//! Heuristic scoring for chatbot platforms.
//!
//! ## Features
//!
//! - Lexicon sentiment, emotion and urgency scoring
//! - Intent classification (naive Bayes blended with keyword overlap)
//! - Spam, bot, fraud, abuse and unusual-activity detection
//! - Churn risk prediction with retention strategies
//! - Product recommendations through a pluggable similarity provider
//! - TF-IDF conversation clustering and FAQ drafting
//!
//! [`ml::pipeline::MLPipeline`] ties the scorers together.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod ml;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
