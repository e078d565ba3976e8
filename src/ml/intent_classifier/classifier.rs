//! Intent model trait definition.

use crate::error::Result;
use crate::ml::intent_classifier::types::IntentPrediction;

/// A single method of predicting intent.
///
/// [`super::IntentClassifier`] blends two implementations of this trait: a
/// trained naive Bayes model and a keyword-overlap heuristic.
pub trait IntentModel: Send + Sync {
    /// Predict the intent for a message.
    fn predict(&self, text: &str) -> Result<IntentPrediction>;

    /// Get the name of this model for debugging and logging.
    fn name(&self) -> &str;
}
