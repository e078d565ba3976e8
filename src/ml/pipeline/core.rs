//! The scoring pipeline.

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::error::{ChatscoreError, Result};
use crate::ml::MessageContext;
use crate::ml::anomaly::AnomalyDetector;
use crate::ml::churn::{ChurnPredictor, ChurnResult, UserActivity};
use crate::ml::clustering::{ClusteringReport, Conversation, ConversationClusterer};
use crate::ml::intent_classifier::IntentClassifier;
use crate::ml::recommendation::{ProductRecommender, RecommendationBundle, RecommendationContext};
use crate::ml::sentiment::SentimentScorer;

use super::builder::MLPipelineBuilder;
use super::config::PipelineConfig;
use super::types::{Analytics, MessageAnalysis, PipelineStats, ScoreOutcome, ScoredMessage};

/// Orchestrates the scorers.
///
/// Sentiment, intent and anomaly scoring run concurrently for every message;
/// churn, recommendations and FAQ generation are independent operations.
pub struct MLPipeline {
    config: PipelineConfig,
    sentiment: Arc<SentimentScorer>,
    intent: Arc<IntentClassifier>,
    anomaly: Arc<AnomalyDetector>,
    churn: ChurnPredictor,
    recommender: ProductRecommender,
    clusterer: ConversationClusterer,
    stats: Mutex<PipelineStats>,
}

impl std::fmt::Debug for MLPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MLPipeline")
            .field("sentiment", &self.sentiment)
            .field("intent", &self.intent)
            .field("anomaly", &self.anomaly)
            .field("churn", &self.churn)
            .field("recommender", &self.recommender)
            .field("clusterer", &self.clusterer)
            .finish_non_exhaustive()
    }
}

impl MLPipeline {
    /// Build a pipeline with default collaborators.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        MLPipelineBuilder::new().config(config).build()
    }

    pub fn builder() -> MLPipelineBuilder {
        MLPipelineBuilder::new()
    }

    pub(crate) fn from_parts(
        config: PipelineConfig,
        sentiment: SentimentScorer,
        intent: IntentClassifier,
        anomaly: AnomalyDetector,
        churn: ChurnPredictor,
        recommender: ProductRecommender,
        clusterer: ConversationClusterer,
    ) -> Self {
        Self {
            config,
            sentiment: Arc::new(sentiment),
            intent: Arc::new(intent),
            anomaly: Arc::new(anomaly),
            churn,
            recommender,
            clusterer,
            stats: Mutex::new(PipelineStats::default()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sentiment(&self) -> &SentimentScorer {
        &self.sentiment
    }

    pub fn intent(&self) -> &IntentClassifier {
        &self.intent
    }

    pub fn anomaly(&self) -> &AnomalyDetector {
        &self.anomaly
    }

    /// Score one message with sentiment, intent and anomaly in parallel.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn analyze_message(&self, message: &str, context: MessageContext) -> MessageAnalysis {
        let start = Instant::now();
        let text: Arc<str> = Arc::from(message);
        let user_id = context.user_id.clone();
        let timestamp = context.timestamp;

        let sentiment = {
            let scorer = Arc::clone(&self.sentiment);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || scorer.analyze(&text))
        };
        let intent = {
            let classifier = Arc::clone(&self.intent);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || classifier.classify(&text))
        };
        let anomaly = {
            let detector = Arc::clone(&self.anomaly);
            let text = Arc::clone(&text);
            tokio::task::spawn_blocking(move || {
                Ok::<_, ChatscoreError>(detector.detect(&text, &context))
            })
        };

        let (sentiment, intent, anomaly) = tokio::join!(sentiment, intent, anomaly);

        let analysis = MessageAnalysis {
            id: Uuid::new_v4(),
            user_id,
            timestamp,
            sentiment: settle("sentiment", sentiment),
            intent: settle("intent", intent),
            anomaly: settle("anomaly", anomaly),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        debug!(
            "analyzed message {} in {:.2} ms ({} failed)",
            analysis.id,
            analysis.processing_time_ms,
            analysis.failures()
        );
        self.record(&analysis);
        analysis
    }

    /// Score many messages. Results keep the input order.
    ///
    /// Messages from different users run concurrently; each user's messages
    /// run one after another in input order, so that user's history and
    /// baseline see them in that order.
    pub async fn analyze_batch(&self, messages: &[ScoredMessage]) -> Vec<MessageAnalysis> {
        let lanes = user_lanes(messages);

        let mut scored: Vec<(usize, MessageAnalysis)> = join_all(lanes.into_iter().map(
            |lane| async move {
                let mut results = Vec::with_capacity(lane.len());
                for index in lane {
                    let message = &messages[index];
                    let analysis = self
                        .analyze_message(&message.message, message.context.clone())
                        .await;
                    results.push((index, analysis));
                }
                results
            },
        ))
        .await
        .into_iter()
        .flatten()
        .collect();

        scored.sort_by_key(|(index, _)| *index);
        scored.into_iter().map(|(_, analysis)| analysis).collect()
    }

    pub fn get_recommendations(
        &self,
        user_id: &str,
        context: &RecommendationContext,
    ) -> RecommendationBundle {
        self.recommender.recommend(user_id, context)
    }

    pub fn predict_churn(&self, user_id: &str, activity: &UserActivity) -> ChurnResult {
        self.churn.predict(user_id, activity)
    }

    /// Cluster historical conversations into FAQ drafts.
    pub fn generate_faqs(&self, conversations: &[Conversation]) -> Result<ClusteringReport> {
        self.clusterer.cluster(conversations)
    }

    /// Snapshot of every component's counters.
    pub fn get_analytics(&self) -> Analytics {
        let stats = self.stats.lock().clone();
        Analytics {
            generated_at: Utc::now(),
            messages_analyzed: stats.messages_analyzed,
            failed_scores: stats.failed_scores,
            average_processing_ms: stats.processing_time_ms.mean(),
            sentiment: self.sentiment.stats(),
            intent: self.intent.stats(),
            anomaly: self.anomaly.stats(),
            churn: self.churn.stats(),
            recommendation: self.recommender.stats(),
            clustering: self.clusterer.stats(),
        }
    }

    /// Zero every counter. Per-user anomaly state is kept.
    pub fn reset_analytics(&self) {
        *self.stats.lock() = PipelineStats::default();
        self.sentiment.reset_stats();
        self.intent.reset_stats();
        self.anomaly.reset_stats();
        self.churn.reset_stats();
        self.recommender.reset_stats();
        self.clusterer.reset_stats();
    }

    fn record(&self, analysis: &MessageAnalysis) {
        let mut stats = self.stats.lock();
        stats.messages_analyzed += 1;
        stats.failed_scores += analysis.failures() as u64;
        stats.processing_time_ms.push(analysis.processing_time_ms);
    }
}

/// Group message indices by user, keeping input order inside each group.
/// Anonymous messages each get their own group.
fn user_lanes(messages: &[ScoredMessage]) -> Vec<Vec<usize>> {
    let mut lanes: Vec<Vec<usize>> = Vec::new();
    let mut lane_of_user: AHashMap<&str, usize> = AHashMap::new();

    for (index, message) in messages.iter().enumerate() {
        match message.context.user_id.as_deref() {
            Some(user_id) => {
                let lane = *lane_of_user.entry(user_id).or_insert_with(|| {
                    lanes.push(Vec::new());
                    lanes.len() - 1
                });
                lanes[lane].push(index);
            }
            None => lanes.push(vec![index]),
        }
    }
    lanes
}

/// Turn a joined scoring task into an outcome, logging failures.
fn settle<T>(
    scorer: &str,
    joined: std::result::Result<Result<T>, JoinError>,
) -> ScoreOutcome<T> {
    let error = match joined {
        Ok(Ok(value)) => return ScoreOutcome::Scored(value),
        Ok(Err(error)) => error,
        Err(join_error) => ChatscoreError::task_join(join_error.to_string()),
    };
    warn!("{scorer} scoring failed: {error}");
    ScoreOutcome::Failed(error.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::ml::anomaly::{ActionKind, CheckType, InMemoryUserStore, Severity, UserStateStore};
    use crate::ml::sentiment::{Emotion, SentimentClass};

    fn pipeline() -> MLPipeline {
        MLPipeline::new(PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_message() {
        let pipeline = pipeline();
        let analysis = pipeline
            .analyze_message(
                "This is terrible, I'm so angry!",
                MessageContext::default(),
            )
            .await;

        let sentiment = analysis.sentiment.value().unwrap();
        assert!(sentiment.score < 0.0);
        assert_eq!(sentiment.classification, SentimentClass::Negative);
        assert!(sentiment.emotions[&Emotion::Anger].detected);
        assert!(analysis.intent.is_scored());
        assert!(analysis.anomaly.is_scored());
        assert_eq!(analysis.failures(), 0);
        assert!(analysis.processing_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_spam_message_is_blocked() {
        let pipeline = pipeline();
        let analysis = pipeline
            .analyze_message(
                "CLICK HERE NOW!!! Win $$$ FREE MONEY!!! bit.ly/xyz",
                MessageContext::default(),
            )
            .await;

        let verdict = analysis.anomaly.value().unwrap();
        let spam = verdict.check(CheckType::Spam).unwrap();
        assert!(spam.detected);
        assert!(verdict.anomalous);
        assert!(verdict.severity >= Severity::High);
        assert_eq!(verdict.action.action, ActionKind::Block);
    }

    #[tokio::test]
    async fn test_rapid_fire_bot_shares_store() {
        let store = Arc::new(InMemoryUserStore::new());
        let pipeline = MLPipeline::builder()
            .user_store(store.clone())
            .build()
            .unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let mut last = None;
        for i in 0..6 {
            let context =
                MessageContext::for_user("user_bot", start + Duration::milliseconds(100 * i));
            last = Some(pipeline.analyze_message("Hello", context).await);
        }

        let verdict = last.unwrap().anomaly.into_value().unwrap();
        let bot = verdict.check(CheckType::Bot).unwrap();
        assert!(bot.detected);
        assert!(bot.indicators.iter().any(|i| i.starts_with("rapid_fire")));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_batch_preserves_order() {
        let pipeline = pipeline();
        let messages = vec![
            ScoredMessage::new("Hello there", MessageContext::default()),
            ScoredMessage::new("I love this, great job", MessageContext::default()),
            ScoredMessage::new("This is awful and broken", MessageContext::default()),
        ];

        let results = pipeline.analyze_batch(&messages).await;
        assert_eq!(results.len(), 3);
        let scores: Vec<f64> = results
            .iter()
            .map(|r| r.sentiment.value().unwrap().score)
            .collect();
        assert!(scores[1] > 0.0);
        assert!(scores[2] < 0.0);
        assert!(pipeline.analyze_batch(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_keeps_each_users_history_in_order() {
        let store = Arc::new(InMemoryUserStore::new());
        let pipeline = MLPipeline::builder()
            .user_store(store.clone())
            .build()
            .unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let mut messages = Vec::new();
        for i in 0..5 {
            for user in ["user_a", "user_b"] {
                let context =
                    MessageContext::for_user(user, start + Duration::milliseconds(200 * i));
                messages.push(ScoredMessage::new(format!("{user} says {i}"), context));
            }
            messages.push(ScoredMessage::new("anonymous", MessageContext::default()));
        }

        let results = pipeline.analyze_batch(&messages).await;
        assert_eq!(results.len(), messages.len());
        for (result, message) in results.iter().zip(&messages) {
            assert_eq!(result.user_id, message.context.user_id);
        }

        for user in ["user_a", "user_b"] {
            let history = store.history(user);
            assert_eq!(history.len(), 5);
            assert!(history.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
        }

        // The fifth message of each user sees the full, evenly paced burst.
        let bot = results[13].anomaly.value().unwrap().check(CheckType::Bot).unwrap();
        assert!(bot.detected);
        assert!(bot.indicators.contains(&"regular_timing".to_string()));
    }

    #[test]
    fn test_user_lanes() {
        let messages = vec![
            ScoredMessage::new("a1", MessageContext::for_user("a", Utc::now())),
            ScoredMessage::new("anon", MessageContext::default()),
            ScoredMessage::new("b1", MessageContext::for_user("b", Utc::now())),
            ScoredMessage::new("a2", MessageContext::for_user("a", Utc::now())),
            ScoredMessage::new("anon", MessageContext::default()),
        ];
        assert_eq!(user_lanes(&messages), vec![vec![0, 3], vec![1], vec![2], vec![4]]);
    }

    #[tokio::test]
    async fn test_analytics_and_reset() {
        let pipeline = pipeline();
        pipeline
            .analyze_message("Hi, what does the pro plan cost?", MessageContext::default())
            .await;
        pipeline.predict_churn("user_1", &UserActivity::default());
        pipeline.get_recommendations("user_1", &RecommendationContext::default());
        pipeline.generate_faqs(&[]).unwrap();

        let analytics = pipeline.get_analytics();
        assert_eq!(analytics.messages_analyzed, 1);
        assert_eq!(analytics.failed_scores, 0);
        assert_eq!(analytics.sentiment.total_analyzed, 1);
        assert_eq!(analytics.intent.total_classified, 1);
        assert_eq!(analytics.anomaly.total_checked, 1);
        assert_eq!(analytics.churn.total_predictions, 1);
        assert_eq!(analytics.recommendation.total_requests, 1);
        assert_eq!(analytics.clustering.total_runs, 1);

        pipeline.reset_analytics();
        let analytics = pipeline.get_analytics();
        assert_eq!(analytics.messages_analyzed, 0);
        assert_eq!(analytics.sentiment.total_analyzed, 0);
        assert_eq!(analytics.churn.total_predictions, 0);
        assert_eq!(analytics.average_processing_ms, 0.0);
    }

    #[test]
    fn test_predict_churn_delegates() {
        let pipeline = pipeline();
        let activity = UserActivity {
            last_activity_date: Some(Utc::now() - Duration::days(45)),
            engagement_score: Some(0.1),
            support_tickets: Some(6),
            plan_downgraded: Some(true),
            ..Default::default()
        };
        let result = pipeline.predict_churn("user_9", &activity);
        assert_eq!(result.user_id, "user_9");
        assert!(result.risk_factors.iter().any(|f| f.factor == "inactive"));
        assert!((0.0..=100.0).contains(&result.risk_score));
    }

    #[test]
    fn test_settle() {
        let outcome: ScoreOutcome<u8> = settle("test", Ok(Ok(1)));
        assert_eq!(outcome, ScoreOutcome::Scored(1));

        let outcome: ScoreOutcome<u8> =
            settle("test", Ok(Err(ChatscoreError::analysis("bad input"))));
        assert_eq!(
            outcome,
            ScoreOutcome::Failed("Analysis error: bad input".to_string())
        );
    }
}
