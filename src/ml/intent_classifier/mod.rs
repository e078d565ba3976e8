//! Intent classification for chat messages.
//!
//! Two [`IntentModel`]s are blended by [`IntentClassifier`]:
//!
//! - [`NaiveBayesIntentModel`]: multinomial naive Bayes trained once on
//!   synthetic sentences built from each intent's keywords
//! - [`KeywordIntentModel`]: fraction of an intent's keywords present in the
//!   message
//!
//! The model's intent wins when its confidence exceeds the configured
//! threshold; otherwise the keyword heuristic decides. Reported confidence is
//! the larger of the two.
//!
//! # Example
//!
//! ```
//! use chatscore::ml::intent_classifier::{Intent, IntentClassifier, IntentConfig};
//!
//! let classifier = IntentClassifier::new(IntentConfig::default()).unwrap();
//! let result = classifier.classify("I want to buy this, take me to checkout").unwrap();
//! assert_eq!(result.intent, Intent::Purchase);
//! assert_eq!(result.suggested_action, "start_checkout");
//! ```

mod classifier;
mod core;
mod keyword_classifier;
mod naive_bayes;
mod templates;
mod types;

pub use classifier::IntentModel;
pub use self::core::{IntentClassifier, IntentConfig, IntentStats, load_training_data};
pub use keyword_classifier::KeywordIntentModel;
pub use naive_bayes::NaiveBayesIntentModel;
pub use templates::{intent_keywords, synthesize_samples};
pub use types::{
    DecisionMethod, Intent, IntentPrediction, IntentProbability, IntentResult, IntentSample,
};
