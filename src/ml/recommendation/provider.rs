//! Similarity data sources for the recommender.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A user similar to the one being served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    pub user_id: String,
    /// `[0, 1]`
    pub similarity: f64,
}

/// A product with a relevance score from some source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredProduct {
    pub product_id: String,
    pub score: f64,
}

/// A currently popular product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingProduct {
    pub product_id: String,
    pub category: String,
    pub score: f64,
}

/// Where the recommender gets user and product similarity from.
///
/// Scoring and merging never look at the data directly, so a real
/// similarity backend can replace [`StaticSimilarityProvider`].
pub trait SimilarityProvider: Send + Sync {
    /// Users most similar to `user_id`, best first.
    fn similar_users(&self, user_id: &str, limit: usize) -> Vec<SimilarUser>;

    /// Products most similar to `product_id`, best first.
    fn similar_products(&self, product_id: &str, limit: usize) -> Vec<ScoredProduct>;

    /// Products the user has already bought or viewed.
    fn user_products(&self, user_id: &str) -> Vec<String>;

    /// Trending products, optionally restricted to a category.
    fn trending(&self, category: Option<&str>) -> Vec<TrendingProduct>;

    fn name(&self) -> &str;
}

/// Fixed in-memory similarity tables.
#[derive(Debug, Clone, Default)]
pub struct StaticSimilarityProvider {
    similar_users: HashMap<String, Vec<SimilarUser>>,
    similar_products: HashMap<String, Vec<ScoredProduct>>,
    user_products: HashMap<String, Vec<String>>,
    trending: Vec<TrendingProduct>,
}

impl StaticSimilarityProvider {
    /// An empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_products<I, S>(mut self, user_id: &str, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_products
            .insert(user_id.to_string(), products.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_similar_users(mut self, user_id: &str, users: &[(&str, f64)]) -> Self {
        let mut users: Vec<SimilarUser> = users
            .iter()
            .map(|(id, similarity)| SimilarUser {
                user_id: id.to_string(),
                similarity: *similarity,
            })
            .collect();
        users.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        self.similar_users.insert(user_id.to_string(), users);
        self
    }

    pub fn with_similar_products(mut self, product_id: &str, products: &[(&str, f64)]) -> Self {
        let mut products: Vec<ScoredProduct> = products
            .iter()
            .map(|(id, score)| ScoredProduct {
                product_id: id.to_string(),
                score: *score,
            })
            .collect();
        products.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.similar_products.insert(product_id.to_string(), products);
        self
    }

    pub fn with_trending(mut self, product_id: &str, category: &str, score: f64) -> Self {
        self.trending.push(TrendingProduct {
            product_id: product_id.to_string(),
            category: category.to_string(),
            score,
        });
        self.trending.sort_by(|a, b| b.score.total_cmp(&a.score));
        self
    }

    /// A small demo catalog of office electronics.
    pub fn sample() -> Self {
        Self::new()
            .with_user_products("user_1", ["laptop", "mouse"])
            .with_user_products("user_2", ["laptop", "keyboard", "monitor"])
            .with_user_products("user_3", ["mouse", "headphones", "webcam"])
            .with_user_products("user_4", ["monitor", "desk_lamp", "office_chair"])
            .with_similar_users("user_1", &[("user_2", 0.8), ("user_3", 0.6)])
            .with_similar_users("user_2", &[("user_1", 0.8), ("user_4", 0.5)])
            .with_similar_users("user_3", &[("user_1", 0.6)])
            .with_similar_users("user_4", &[("user_2", 0.5)])
            .with_similar_products("laptop", &[("laptop_bag", 0.9), ("usb_hub", 0.7), ("monitor", 0.6)])
            .with_similar_products("mouse", &[("keyboard", 0.8), ("mouse_pad", 0.7)])
            .with_similar_products("keyboard", &[("mouse", 0.8), ("wrist_rest", 0.6)])
            .with_similar_products("monitor", &[("monitor_arm", 0.8), ("hdmi_cable", 0.6)])
            .with_similar_products("headphones", &[("webcam", 0.6), ("microphone", 0.7)])
            .with_trending("wireless_earbuds", "electronics", 0.95)
            .with_trending("smart_watch", "electronics", 0.9)
            .with_trending("standing_desk", "furniture", 0.85)
            .with_trending("usb_hub", "accessories", 0.8)
            .with_trending("ergonomic_chair", "furniture", 0.75)
            .with_trending("portable_ssd", "electronics", 0.7)
            .with_trending("laptop_bag", "accessories", 0.65)
    }
}

impl SimilarityProvider for StaticSimilarityProvider {
    fn similar_users(&self, user_id: &str, limit: usize) -> Vec<SimilarUser> {
        self.similar_users
            .get(user_id)
            .map(|users| users.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn similar_products(&self, product_id: &str, limit: usize) -> Vec<ScoredProduct> {
        self.similar_products
            .get(product_id)
            .map(|products| products.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn user_products(&self, user_id: &str) -> Vec<String> {
        self.user_products.get(user_id).cloned().unwrap_or_default()
    }

    fn trending(&self, category: Option<&str>) -> Vec<TrendingProduct> {
        self.trending
            .iter()
            .filter(|product| category.is_none_or(|c| product.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect()
    }

    fn name(&self) -> &str {
        "static"
    }
}
