//! FAQ drafting and content suggestions from conversation clusters.

use serde::{Deserialize, Serialize};

use crate::ml::clustering::tfidf::SparseVector;
use crate::ml::clustering::{ClusteredConversation, ConversationCluster};

/// Confidence contribution that does not depend on cluster size.
const BASE_CONFIDENCE: f64 = 0.8;

/// A drafted FAQ entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqEntry {
    pub cluster_id: String,
    pub question: String,
    pub answer: String,
    /// Up to three other questions from the same cluster.
    pub similar_questions: Vec<String>,
    pub topic: String,
    /// Number of conversations behind this entry.
    pub frequency: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Asked very often; worth a dedicated article or flow.
    HighFrequencyTopic,
    /// Asked once; may need a new answer or may be noise.
    UniqueQuestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSuggestion {
    pub kind: SuggestionKind,
    pub cluster_id: String,
    pub priority: Priority,
    pub message: String,
}

/// Draft one FAQ per cluster with at least `min_size` members.
///
/// `member_vectors[i]` holds the vectors of `clusters[i].conversations`, member by
/// member.
pub(crate) fn draft_faqs(
    clusters: &[ConversationCluster],
    member_vectors: &[Vec<SparseVector>],
    centroids: &[SparseVector],
    min_size: usize,
    max_similar: usize,
) -> Vec<FaqEntry> {
    clusters
        .iter()
        .zip(member_vectors)
        .zip(centroids)
        .filter(|((cluster, _), _)| cluster.size >= min_size)
        .map(|((cluster, vectors), centroid)| {
            let representative = representative_index(vectors, centroid);
            let chosen: &ClusteredConversation = &cluster.conversations[representative];
            let similar_questions = cluster
                .conversations
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != representative)
                .map(|(_, conversation)| conversation.question.clone())
                .take(max_similar)
                .collect();

            FaqEntry {
                cluster_id: cluster.id.clone(),
                question: chosen.question.clone(),
                answer: chosen.answer.clone(),
                similar_questions,
                topic: cluster.topic.clone(),
                frequency: cluster.size,
                confidence: faq_confidence(cluster.size),
            }
        })
        .collect()
}

/// `0.6 × min(size / 10, 1) + 0.4 × 0.8`
pub fn faq_confidence(size: usize) -> f64 {
    0.6 * (size as f64 / 10.0).min(1.0) + 0.4 * BASE_CONFIDENCE
}

/// Flag very large clusters and singletons.
pub(crate) fn suggest(
    clusters: &[ConversationCluster],
    high_frequency_size: usize,
) -> Vec<ImprovementSuggestion> {
    let mut suggestions = Vec::new();
    for cluster in clusters {
        if cluster.size > high_frequency_size {
            suggestions.push(ImprovementSuggestion {
                kind: SuggestionKind::HighFrequencyTopic,
                cluster_id: cluster.id.clone(),
                priority: Priority::High,
                message: format!(
                    "{} conversations about \"{}\": consider a dedicated help article or automated flow",
                    cluster.size, cluster.topic
                ),
            });
        } else if cluster.size == 1 {
            suggestions.push(ImprovementSuggestion {
                kind: SuggestionKind::UniqueQuestion,
                cluster_id: cluster.id.clone(),
                priority: Priority::Low,
                message: format!(
                    "Unique question: \"{}\". Check whether the bot's answer covers it",
                    cluster.conversations[0].question
                ),
            });
        }
    }
    suggestions
}

/// Member closest to the centroid; the first one wins ties.
fn representative_index(vectors: &[SparseVector], centroid: &SparseVector) -> usize {
    let mut best = 0;
    let mut best_similarity = f64::NEG_INFINITY;
    for (i, vector) in vectors.iter().enumerate() {
        let similarity = vector.cosine(centroid);
        if similarity > best_similarity {
            best = i;
            best_similarity = similarity;
        }
    }
    best
}
