//! Builder for creating MLPipeline instances.

use std::sync::Arc;

use log::info;

use crate::error::Result;
use crate::ml::anomaly::{AnomalyDetector, InMemoryUserStore, UserStateStore};
use crate::ml::churn::ChurnPredictor;
use crate::ml::clustering::ConversationClusterer;
use crate::ml::intent_classifier::{IntentClassifier, IntentSample, load_training_data};
use crate::ml::recommendation::{
    ProductCatalog, ProductRecommender, SimilarityProvider, StaticSimilarityProvider,
};
use crate::ml::sentiment::SentimentScorer;

use super::config::PipelineConfig;
use super::core::MLPipeline;

/// Builder for creating `MLPipeline` instances.
///
/// Collaborators that are not supplied fall back to the in-memory user store
/// and the built-in sample product data.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use chatscore::ml::anomaly::InMemoryUserStore;
/// use chatscore::ml::pipeline::{MLPipelineBuilder, PipelineConfig};
///
/// # fn main() -> chatscore::error::Result<()> {
/// let store = Arc::new(InMemoryUserStore::new());
/// let pipeline = MLPipelineBuilder::new()
///     .config(PipelineConfig::default())
///     .user_store(store)
///     .build()?;
/// assert_eq!(pipeline.get_analytics().messages_analyzed, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MLPipelineBuilder {
    config: PipelineConfig,
    user_store: Option<Arc<dyn UserStateStore>>,
    similarity_provider: Option<Arc<dyn SimilarityProvider>>,
    catalog: Option<ProductCatalog>,
    intent_samples: Vec<IntentSample>,
}

impl MLPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Per-user history and baseline store used by the anomaly checks.
    pub fn user_store(mut self, store: Arc<dyn UserStateStore>) -> Self {
        self.user_store = Some(store);
        self
    }

    pub fn similarity_provider(mut self, provider: Arc<dyn SimilarityProvider>) -> Self {
        self.similarity_provider = Some(provider);
        self
    }

    /// Cross-sell and up-sell tables.
    pub fn catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Labelled samples added to the intent model's synthetic corpus.
    pub fn intent_samples(mut self, samples: Vec<IntentSample>) -> Self {
        self.intent_samples.extend(samples);
        self
    }

    /// Validate the configuration and build every component.
    pub fn build(self) -> Result<MLPipeline> {
        let MLPipelineBuilder {
            config,
            user_store,
            similarity_provider,
            catalog,
            mut intent_samples,
        } = self;

        config.validate()?;

        if let Some(path) = &config.intent_training_data {
            let samples = load_training_data(path)?;
            info!(
                "loaded {} intent samples from {}",
                samples.len(),
                path.display()
            );
            intent_samples.extend(samples);
        }

        let sentiment = SentimentScorer::new(config.sentiment.clone())?;
        let intent = IntentClassifier::with_samples(config.intent.clone(), intent_samples)?;
        let anomaly = AnomalyDetector::with_store(
            config.anomaly.clone(),
            user_store.unwrap_or_else(|| Arc::new(InMemoryUserStore::new())),
        )?;
        let churn = ChurnPredictor::new(config.churn.clone())?;
        let recommender = ProductRecommender::with_provider(
            config.recommendation.clone(),
            similarity_provider.unwrap_or_else(|| Arc::new(StaticSimilarityProvider::sample())),
            catalog.unwrap_or_else(ProductCatalog::sample),
        )?;
        let clusterer = ConversationClusterer::new(config.clustering.clone())?;

        info!("scoring pipeline ready");

        Ok(MLPipeline::from_parts(
            config,
            sentiment,
            intent,
            anomaly,
            churn,
            recommender,
            clusterer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ChatscoreError;
    use crate::ml::MessageContext;
    use crate::ml::intent_classifier::Intent;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.recommendation.trending_weight = -1.0;
        let result = MLPipelineBuilder::new().config(config).build();
        assert!(matches!(result, Err(ChatscoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_training_data() {
        let config = PipelineConfig {
            intent_training_data: Some("/nonexistent/intents.json".into()),
            ..Default::default()
        };
        let result = MLPipelineBuilder::new().config(config).build();
        assert!(matches!(result, Err(ChatscoreError::Io(_))));
    }

    #[test]
    fn test_injected_store_receives_history() {
        let store = Arc::new(InMemoryUserStore::new());
        let pipeline = MLPipelineBuilder::new()
            .user_store(store.clone())
            .build()
            .unwrap();

        let context = MessageContext::for_user("user_1", chrono::Utc::now());
        let analysis = tokio_test::block_on(pipeline.analyze_message("hello", context));

        assert!(analysis.anomaly.is_scored());
        assert_eq!(store.history("user_1").len(), 1);
    }

    #[test]
    fn test_training_data_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"text": "where is my parcel", "intent": "support"}}]"#
        )
        .unwrap();

        let config = PipelineConfig {
            intent_training_data: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let pipeline = MLPipelineBuilder::new()
            .config(config)
            .intent_samples(vec![IntentSample {
                text: "parcel never arrived".to_string(),
                intent: Intent::Support,
            }])
            .build()
            .unwrap();
        assert_eq!(pipeline.config().intent_training_data, Some(file.path().to_path_buf()));
    }
}
