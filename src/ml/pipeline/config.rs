//! Aggregated configuration for every pipeline component.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::anomaly::AnomalyConfig;
use crate::ml::churn::ChurnConfig;
use crate::ml::clustering::ClusteringConfig;
use crate::ml::intent_classifier::IntentConfig;
use crate::ml::recommendation::RecommendationConfig;
use crate::ml::sentiment::SentimentConfig;

/// Configuration for [`super::MLPipeline`].
///
/// Every section is optional in JSON; missing sections and fields take their
/// defaults.
///
/// ```
/// use chatscore::ml::pipeline::PipelineConfig;
///
/// let config: PipelineConfig =
///     serde_json::from_str(r#"{"anomaly": {"spamThreshold": 0.4}}"#).unwrap();
/// assert_eq!(config.anomaly.spam_threshold, 0.4);
/// assert_eq!(config.anomaly.bot_threshold, 0.6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub sentiment: SentimentConfig,
    pub intent: IntentConfig,
    pub anomaly: AnomalyConfig,
    pub churn: ChurnConfig,
    pub recommendation: RecommendationConfig,
    pub clustering: ClusteringConfig,
    /// Extra labelled intent samples (`[{"text", "intent"}]`), relative to
    /// the working directory.
    pub intent_training_data: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.sentiment.validate()?;
        self.intent.validate()?;
        self.anomaly.validate()?;
        self.churn.validate()?;
        self.recommendation.validate()?;
        self.clustering.validate()?;
        Ok(())
    }
}
