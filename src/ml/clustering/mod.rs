//! Conversation clustering and FAQ drafting.
//!
//! Q&A pairs are vectorized with TF-IDF and grouped by greedy agglomerative
//! clustering: start with one cluster per conversation and keep merging the
//! pair of clusters whose centroids are most cosine-similar. Merging stops at
//! the target count `min(max_clusters, n / 3)` or when the best remaining
//! similarity falls below the merge threshold. Each merge costs O(k²)
//! comparisons, which is fine for the batch sizes this runs on.
//!
//! # Example
//!
//! ```
//! use chatscore::ml::clustering::{ClusteringConfig, ConversationClusterer};
//!
//! let clusterer = ConversationClusterer::new(ClusteringConfig::default()).unwrap();
//! let report = clusterer.cluster(&[]).unwrap();
//! assert!(report.clusters.is_empty());
//! assert!(report.faqs.is_empty());
//! ```

mod faq;
pub mod tfidf;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::error::{ChatscoreError, Result};

pub use faq::{FaqEntry, ImprovementSuggestion, Priority, SuggestionKind, faq_confidence};
use tfidf::{SparseVector, TfIdfVectorizer};

/// A historical question and the answer it got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl Conversation {
    pub fn new<Q: Into<String>, A: Into<String>>(question: Q, answer: A) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    fn text(&self) -> String {
        format!("{} {}", self.question, self.answer)
    }
}

/// A conversation inside a cluster, with its own heaviest terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteredConversation {
    pub question: String,
    pub answer: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCluster {
    pub id: String,
    pub conversations: Vec<ClusteredConversation>,
    /// Mean TF-IDF vector of the members.
    pub centroid: BTreeMap<String, f64>,
    pub top_terms: Vec<String>,
    pub topic: String,
    pub size: usize,
    /// Share of all clustered conversations.
    pub frequency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringReport {
    /// Largest first.
    pub clusters: Vec<ConversationCluster>,
    pub faqs: Vec<FaqEntry>,
    pub suggestions: Vec<ImprovementSuggestion>,
}

/// Configuration for clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusteringConfig {
    /// Stop merging when the best centroid similarity is below this.
    pub similarity_threshold: f64,
    pub max_clusters: usize,
    /// Target is `n / conversations_per_cluster`, capped at `max_clusters`.
    pub conversations_per_cluster: usize,
    /// Terms kept per conversation and per cluster.
    pub top_terms: usize,
    /// Terms joined into the cluster topic.
    pub topic_terms: usize,
    pub min_faq_cluster_size: usize,
    pub max_similar_questions: usize,
    /// Clusters larger than this get a high-frequency suggestion.
    pub high_frequency_size: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            max_clusters: 10,
            conversations_per_cluster: 3,
            top_terms: 5,
            topic_terms: 3,
            min_faq_cluster_size: 2,
            max_similar_questions: 3,
            high_frequency_size: 10,
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ChatscoreError::invalid_config(
                "similarityThreshold must be within [0, 1]",
            ));
        }
        if self.max_clusters == 0 || self.conversations_per_cluster == 0 {
            return Err(ChatscoreError::invalid_config(
                "maxClusters and conversationsPerCluster must be at least 1",
            ));
        }
        Ok(())
    }

    /// Number of clusters merging aims for, never below 1.
    pub fn target_clusters(&self, conversations: usize) -> usize {
        (conversations / self.conversations_per_cluster)
            .min(self.max_clusters)
            .max(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringStats {
    pub total_runs: u64,
    pub conversations_processed: u64,
    pub clusters_formed: u64,
    pub faqs_generated: u64,
}

/// Working state of one cluster during merging.
struct Group {
    members: Vec<usize>,
    centroid: SparseVector,
}

/// Clusters conversations and drafts FAQs from the clusters.
pub struct ConversationClusterer {
    config: ClusteringConfig,
    analyzer: Arc<dyn Analyzer>,
    stats: Mutex<ClusteringStats>,
}

impl std::fmt::Debug for ConversationClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationClusterer")
            .field("config", &self.config)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl ConversationClusterer {
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        Self::with_analyzer(config, Arc::new(StandardAnalyzer::new()))
    }

    pub fn with_analyzer(config: ClusteringConfig, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            analyzer,
            stats: Mutex::new(ClusteringStats::default()),
        })
    }

    /// Cluster conversations and draft FAQs and suggestions.
    pub fn cluster(&self, conversations: &[Conversation]) -> Result<ClusteringReport> {
        if conversations.is_empty() {
            self.record(0, 0, 0);
            return Ok(ClusteringReport::default());
        }

        let texts: Vec<String> = conversations.iter().map(Conversation::text).collect();
        let mut vectorizer = TfIdfVectorizer::new(Arc::clone(&self.analyzer));
        vectorizer.fit(&texts)?;
        let vectors: Vec<SparseVector> = texts
            .par_iter()
            .map(|text| vectorizer.transform(text))
            .collect::<Result<_>>()?;

        let target = self.config.target_clusters(conversations.len());
        let mut groups = self.agglomerate(&vectors, target);
        groups.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then(a.members[0].cmp(&b.members[0]))
        });

        let total = conversations.len() as f64;
        let mut clusters = Vec::with_capacity(groups.len());
        let mut member_vectors = Vec::with_capacity(groups.len());
        let mut centroids = Vec::with_capacity(groups.len());

        for (index, group) in groups.into_iter().enumerate() {
            let top_terms = group.centroid.top_terms(self.config.top_terms);
            let topic = self.topic(&top_terms);
            let members = group
                .members
                .iter()
                .map(|&i| ClusteredConversation {
                    question: conversations[i].question.clone(),
                    answer: conversations[i].answer.clone(),
                    keywords: vectors[i].top_terms(self.config.top_terms),
                })
                .collect::<Vec<_>>();

            clusters.push(ConversationCluster {
                id: format!("cluster_{index}"),
                size: members.len(),
                frequency: members.len() as f64 / total,
                conversations: members,
                centroid: group.centroid.to_sorted_map(),
                top_terms,
                topic,
            });
            member_vectors.push(group.members.iter().map(|&i| vectors[i].clone()).collect());
            centroids.push(group.centroid);
        }

        let faqs = faq::draft_faqs(
            &clusters,
            &member_vectors,
            &centroids,
            self.config.min_faq_cluster_size,
            self.config.max_similar_questions,
        );
        let suggestions = faq::suggest(&clusters, self.config.high_frequency_size);

        debug!(
            "clustered {} conversations into {} clusters (target {target}), {} faqs",
            conversations.len(),
            clusters.len(),
            faqs.len()
        );
        self.record(conversations.len(), clusters.len(), faqs.len());

        Ok(ClusteringReport {
            clusters,
            faqs,
            suggestions,
        })
    }

    pub fn stats(&self) -> ClusteringStats {
        self.stats.lock().clone()
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = ClusteringStats::default();
    }

    fn agglomerate(&self, vectors: &[SparseVector], target: usize) -> Vec<Group> {
        let mut groups: Vec<Group> = vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| Group {
                members: vec![i],
                centroid: vector.clone(),
            })
            .collect();

        while groups.len() > target {
            let Some((a, b, similarity)) = most_similar_pair(&groups) else {
                break;
            };
            if similarity < self.config.similarity_threshold {
                break;
            }

            let absorbed = groups.remove(b);
            let group = &mut groups[a];
            group.members.extend(absorbed.members);
            group.centroid = SparseVector::mean(group.members.iter().map(|&i| &vectors[i]));
        }

        groups
    }

    fn topic(&self, top_terms: &[String]) -> String {
        let terms: Vec<&str> = top_terms
            .iter()
            .take(self.config.topic_terms)
            .map(String::as_str)
            .collect();
        if terms.is_empty() {
            "general".to_string()
        } else {
            terms.join(" ")
        }
    }

    fn record(&self, conversations: usize, clusters: usize, faqs: usize) {
        let mut stats = self.stats.lock();
        stats.total_runs += 1;
        stats.conversations_processed += conversations as u64;
        stats.clusters_formed += clusters as u64;
        stats.faqs_generated += faqs as u64;
    }
}

/// Indices `(a, b)` with `a < b` of the most similar centroids. The first
/// pair found wins ties.
fn most_similar_pair(groups: &[Group]) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for a in 0..groups.len() {
        for b in (a + 1)..groups.len() {
            let similarity = groups[a].centroid.cosine(&groups[b].centroid);
            if best.is_none_or(|(_, _, s)| similarity > s) {
                best = Some((a, b, similarity));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusterer() -> ConversationClusterer {
        ConversationClusterer::new(ClusteringConfig::default()).unwrap()
    }

    fn corpus() -> Vec<Conversation> {
        vec![
            Conversation::new("How do I reset my password?", "Use the reset password link."),
            Conversation::new("I forgot my password, how to reset it?", "Use the reset password link."),
            Conversation::new("Password reset link please", "Use the reset password link."),
            Conversation::new("What are your shipping costs?", "Shipping costs depend on weight."),
            Conversation::new("How much are shipping costs abroad?", "Shipping costs depend on weight."),
            Conversation::new("Shipping costs to Canada?", "Shipping costs depend on weight."),
            Conversation::new("Do you sell gift vouchers?", "Yes, in the store."),
        ]
    }

    #[test]
    fn test_empty_input() {
        let report = clusterer().cluster(&[]).unwrap();
        assert!(report.clusters.is_empty());
        assert!(report.faqs.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_groups_similar_questions() {
        let conversations = corpus();
        let report = clusterer().cluster(&conversations).unwrap();

        // target is min(10, 7 / 3) = 2, but the unrelated question stays apart
        // because its similarity to either group is below the threshold.
        assert_eq!(report.clusters.len(), 3);
        let sizes: Vec<usize> = report.clusters.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(report.clusters[0].id, "cluster_0");

        let total: f64 = report.clusters.iter().map(|c| c.frequency).sum();
        assert!((total - 1.0).abs() < 1e-9);

        for cluster in &report.clusters {
            assert!(cluster.top_terms.len() <= 5);
        }
    }

    #[test]
    fn test_faqs_and_suggestions() {
        let report = clusterer().cluster(&corpus()).unwrap();

        assert_eq!(report.faqs.len(), 2);
        for faq in &report.faqs {
            assert_eq!(faq.frequency, 3);
            assert_eq!(faq.similar_questions.len(), 2);
            assert!((faq.confidence - faq_confidence(3)).abs() < 1e-12);
        }

        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.suggestions[0].kind, SuggestionKind::UniqueQuestion);
        assert_eq!(report.suggestions[0].cluster_id, "cluster_2");
    }

    #[test]
    fn test_single_conversation() {
        let report = clusterer()
            .cluster(&[Conversation::new("Where is my order?", "On its way.")])
            .unwrap();
        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].frequency, 1.0);
        assert!(report.faqs.is_empty());
        assert_eq!(report.suggestions.len(), 1);
    }

    #[test]
    fn test_large_cluster_suggestion() {
        let conversations: Vec<Conversation> = (0..12)
            .map(|_| Conversation::new("refund status", "Refunds take 5 days."))
            .collect();
        let config = ClusteringConfig {
            max_clusters: 1,
            ..Default::default()
        };
        let report = ConversationClusterer::new(config)
            .unwrap()
            .cluster(&conversations)
            .unwrap();

        assert_eq!(report.clusters.len(), 1);
        assert_eq!(report.clusters[0].size, 12);
        assert_eq!(report.suggestions[0].kind, SuggestionKind::HighFrequencyTopic);
        assert!((report.faqs[0].confidence - 0.92).abs() < 1e-12);
        assert_eq!(report.faqs[0].similar_questions.len(), 3);
    }

    #[test]
    fn test_target_clusters() {
        let config = ClusteringConfig::default();
        assert_eq!(config.target_clusters(1), 1);
        assert_eq!(config.target_clusters(9), 3);
        assert_eq!(config.target_clusters(300), 10);
    }

    #[test]
    fn test_stats() {
        let clusterer = clusterer();
        clusterer.cluster(&corpus()).unwrap();
        clusterer.cluster(&[]).unwrap();
        let stats = clusterer.stats();
        assert_eq!(stats.total_runs, 2);
        assert_eq!(stats.conversations_processed, 7);
        assert_eq!(stats.faqs_generated, 2);
    }
}
