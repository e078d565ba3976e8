//! Intent keyword lists and synthetic training sentences.

use crate::ml::intent_classifier::types::{Intent, IntentSample};

/// Sentence frames; `{}` is replaced by an intent keyword.
const TEMPLATES: &[&str] = &[
    "{}",
    "{} please",
    "i need {}",
    "can you tell me about {}",
    "{} for my account",
];

/// Keywords characteristic of each intent.
pub fn intent_keywords(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Greeting => &[
            "hello",
            "hi",
            "hey",
            "good morning",
            "good afternoon",
            "greetings",
        ],
        Intent::ProductInquiry => &[
            "product",
            "feature",
            "available",
            "stock",
            "size",
            "color",
            "specification",
            "details",
        ],
        Intent::Purchase => &[
            "buy",
            "purchase",
            "order",
            "checkout",
            "cart",
            "add to cart",
            "payment",
        ],
        Intent::Support => &[
            "help",
            "problem",
            "issue",
            "error",
            "not working",
            "broken",
            "fix",
            "reset",
        ],
        Intent::Complaint => &[
            "complaint",
            "terrible",
            "disappointed",
            "refund",
            "angry",
            "worst",
            "unacceptable",
        ],
        Intent::Pricing => &[
            "price",
            "cost",
            "how much",
            "discount",
            "plan",
            "pricing",
            "expensive",
        ],
        Intent::Goodbye => &[
            "bye",
            "goodbye",
            "see you",
            "thanks",
            "thank you",
            "that's all",
        ],
    }
}

/// Synthesize up to `per_keyword` training sentences for every keyword of
/// every intent.
pub fn synthesize_samples(per_keyword: usize) -> Vec<IntentSample> {
    let per_keyword = per_keyword.min(TEMPLATES.len());

    Intent::ALL
        .iter()
        .flat_map(|&intent| {
            intent_keywords(intent).iter().flat_map(move |keyword| {
                TEMPLATES[..per_keyword].iter().map(move |template| IntentSample {
                    text: template.replace("{}", keyword),
                    intent,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_counts() {
        let samples = synthesize_samples(5);
        let keyword_total: usize = Intent::ALL.iter().map(|i| intent_keywords(*i).len()).sum();
        assert_eq!(samples.len(), keyword_total * 5);

        // More templates than exist is capped.
        assert_eq!(synthesize_samples(50).len(), samples.len());
    }

    #[test]
    fn test_samples_contain_keyword() {
        for sample in synthesize_samples(5) {
            let keywords = intent_keywords(sample.intent);
            assert!(keywords.iter().any(|k| sample.text.contains(k)), "{}", sample.text);
        }
    }
}
