//! Message scoring pipeline.
//!
//! `MLPipeline` owns one instance of every scorer. Per-message work
//! (sentiment, intent, anomaly) is dispatched to Tokio's blocking pool and
//! settled independently; the other operations delegate directly.
//!
//! # Example
//!
//! ```
//! use chatscore::ml::MessageContext;
//! use chatscore::ml::pipeline::{MLPipeline, PipelineConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> chatscore::error::Result<()> {
//! let pipeline = MLPipeline::new(PipelineConfig::default())?;
//! let analysis = pipeline
//!     .analyze_message("Where is my order?", MessageContext::default())
//!     .await;
//! assert!(analysis.sentiment.is_scored());
//! assert_eq!(pipeline.get_analytics().messages_analyzed, 1);
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod core;
mod types;

pub use builder::MLPipelineBuilder;
pub use config::PipelineConfig;
pub use self::core::MLPipeline;
pub use types::{Analytics, MessageAnalysis, ScoreOutcome, ScoredMessage};
