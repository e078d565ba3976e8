//! Product recommendations blended from three strategies.
//!
//! - collaborative: products owned by similar users
//! - content: products similar to the user's own (trending when the user has
//!   no history)
//! - trending: popular products, optionally filtered by category
//!
//! Lists are merged by product id, summing `score × strategy weight`, and
//! ranked by the merged score. Cross-sell and up-sell suggestions come from a
//! [`ProductCatalog`] and are only produced for users with history.

mod catalog;
mod provider;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatscoreError, Result};
use crate::ml::RunningMean;

pub use catalog::ProductCatalog;
pub use provider::{
    ScoredProduct, SimilarUser, SimilarityProvider, StaticSimilarityProvider, TrendingProduct,
};

/// Configuration for the recommender.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendationConfig {
    pub collaborative_weight: f64,
    pub content_weight: f64,
    pub trending_weight: f64,
    pub max_recommended: usize,
    pub max_cross_sell: usize,
    pub max_up_sell: usize,
    pub max_trending: usize,
    pub cross_sell_boost: f64,
    pub up_sell_boost: f64,
    /// Similar users consulted for collaborative scores.
    pub similar_users_limit: usize,
    /// Similar products consulted per owned product.
    pub similar_products_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            collaborative_weight: 0.4,
            content_weight: 0.35,
            trending_weight: 0.25,
            max_recommended: 10,
            max_cross_sell: 5,
            max_up_sell: 3,
            max_trending: 5,
            cross_sell_boost: 1.2,
            up_sell_boost: 1.5,
            similar_users_limit: 10,
            similar_products_limit: 5,
        }
    }
}

impl RecommendationConfig {
    /// Blend weights and boosts must be non-negative.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("collaborativeWeight", self.collaborative_weight),
            ("contentWeight", self.content_weight),
            ("trendingWeight", self.trending_weight),
            ("crossSellBoost", self.cross_sell_boost),
            ("upSellBoost", self.up_sell_boost),
        ];
        for (name, value) in values {
            if value.is_nan() || value < 0.0 {
                return Err(ChatscoreError::invalid_config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Caller context for a recommendation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendationContext {
    /// Restrict trending products to this category.
    pub category: Option<String>,
    /// Product the user is looking at right now; used as an extra content seed.
    pub current_product: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    Content,
    Trending,
    CrossSell,
    UpSell,
}

/// One recommended product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_id: String,
    pub score: f64,
    /// Strategies that contributed to the score.
    pub sources: BTreeSet<Strategy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBundle {
    pub user_id: String,
    /// Merged ranking, best first.
    pub recommended: Vec<Recommendation>,
    pub cross_sell: Vec<Recommendation>,
    pub up_sell: Vec<Recommendation>,
    pub trending: Vec<Recommendation>,
    /// Step function of history length.
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationStats {
    pub total_requests: u64,
    /// Requests for users without history.
    pub cold_starts: u64,
    pub products_recommended: u64,
    pub average_confidence: RunningMean,
}

/// Blends collaborative, content and trending recommendations.
pub struct ProductRecommender {
    config: RecommendationConfig,
    provider: Arc<dyn SimilarityProvider>,
    catalog: ProductCatalog,
    stats: Mutex<RecommendationStats>,
}

impl std::fmt::Debug for ProductRecommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRecommender")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl ProductRecommender {
    /// Recommender over the built-in sample data.
    pub fn new(config: RecommendationConfig) -> Result<Self> {
        Self::with_provider(
            config,
            Arc::new(StaticSimilarityProvider::sample()),
            ProductCatalog::sample(),
        )
    }

    pub fn with_provider(
        config: RecommendationConfig,
        provider: Arc<dyn SimilarityProvider>,
        catalog: ProductCatalog,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            catalog,
            stats: Mutex::new(RecommendationStats::default()),
        })
    }

    /// Recommend products for a user.
    pub fn recommend(&self, user_id: &str, context: &RecommendationContext) -> RecommendationBundle {
        let history = self.provider.user_products(user_id);
        let owned: BTreeSet<&str> = history.iter().map(String::as_str).collect();

        let trending = self.trending(context, &owned);
        let collaborative = self.collaborative(user_id, &owned);
        let content = if history.is_empty() {
            trending.clone()
        } else {
            self.content(&history, context.current_product.as_deref(), &owned)
        };

        let mut recommended = merge(&[
            (Strategy::Collaborative, self.config.collaborative_weight, &collaborative),
            (Strategy::Content, self.config.content_weight, &content),
            (Strategy::Trending, self.config.trending_weight, &trending),
        ]);
        recommended.truncate(self.config.max_recommended);

        let (cross_sell, up_sell) = if history.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                self.from_catalog(&history, &owned, Strategy::CrossSell),
                self.from_catalog(&history, &owned, Strategy::UpSell),
            )
        };

        let trending = trending
            .into_iter()
            .take(self.config.max_trending)
            .map(|product| Recommendation {
                product_id: product.product_id,
                score: product.score,
                sources: BTreeSet::from([Strategy::Trending]),
            })
            .collect();

        let confidence = confidence_for_history(history.len());

        debug!(
            "recommendations for {user_id}: {} ranked, history {}, confidence {confidence}",
            recommended.len(),
            history.len()
        );
        self.record(history.is_empty(), recommended.len(), confidence);

        RecommendationBundle {
            user_id: user_id.to_string(),
            recommended,
            cross_sell,
            up_sell,
            trending,
            confidence,
        }
    }

    pub fn stats(&self) -> RecommendationStats {
        self.stats.lock().clone()
    }

    pub fn reset_stats(&self) {
        *self.stats.lock() = RecommendationStats::default();
    }

    /// Products of similar users, scored by summed similarity normalized to
    /// the best candidate.
    fn collaborative(&self, user_id: &str, owned: &BTreeSet<&str>) -> Vec<ScoredProduct> {
        let mut scores: HashMap<String, f64> = HashMap::new();
        for neighbor in self
            .provider
            .similar_users(user_id, self.config.similar_users_limit)
        {
            for product in self.provider.user_products(&neighbor.user_id) {
                if !owned.contains(product.as_str()) {
                    *scores.entry(product).or_insert(0.0) += neighbor.similarity;
                }
            }
        }

        let best = scores.values().copied().fold(0.0, f64::max);
        let mut products: Vec<ScoredProduct> = scores
            .into_iter()
            .map(|(product_id, score)| ScoredProduct {
                product_id,
                score: if best > 0.0 { score / best } else { 0.0 },
            })
            .collect();
        sort_products(&mut products);
        products
    }

    /// Products similar to owned ones (and the one being viewed), keeping the
    /// best similarity per product.
    fn content(
        &self,
        history: &[String],
        current_product: Option<&str>,
        owned: &BTreeSet<&str>,
    ) -> Vec<ScoredProduct> {
        let mut scores: HashMap<String, f64> = HashMap::new();
        let seeds = history.iter().map(String::as_str).chain(current_product);
        for seed in seeds {
            for similar in self
                .provider
                .similar_products(seed, self.config.similar_products_limit)
            {
                let id = similar.product_id.as_str();
                if owned.contains(id) || Some(id) == current_product {
                    continue;
                }
                let entry = scores.entry(similar.product_id).or_insert(0.0);
                *entry = entry.max(similar.score);
            }
        }

        let mut products: Vec<ScoredProduct> = scores
            .into_iter()
            .map(|(product_id, score)| ScoredProduct { product_id, score })
            .collect();
        sort_products(&mut products);
        products
    }

    /// Trending products in the requested category that the user does not own.
    fn trending(
        &self,
        context: &RecommendationContext,
        owned: &BTreeSet<&str>,
    ) -> Vec<ScoredProduct> {
        let mut products: Vec<ScoredProduct> = self
            .provider
            .trending(context.category.as_deref())
            .into_iter()
            .filter(|product| !owned.contains(product.product_id.as_str()))
            .map(|product| ScoredProduct {
                product_id: product.product_id,
                score: product.score,
            })
            .collect();
        sort_products(&mut products);
        products
    }

    fn from_catalog(
        &self,
        history: &[String],
        owned: &BTreeSet<&str>,
        strategy: Strategy,
    ) -> Vec<Recommendation> {
        let (table, boost, limit) = match strategy {
            Strategy::UpSell => (
                &self.catalog.up_sell,
                self.config.up_sell_boost,
                self.config.max_up_sell,
            ),
            _ => (
                &self.catalog.cross_sell,
                self.config.cross_sell_boost,
                self.config.max_cross_sell,
            ),
        };

        let mut best: HashMap<&str, f64> = HashMap::new();
        for product in history {
            for (candidate, base) in table.get(product).into_iter().flatten() {
                if owned.contains(candidate.as_str()) {
                    continue;
                }
                let entry = best.entry(candidate.as_str()).or_insert(0.0);
                *entry = entry.max(base * boost);
            }
        }

        let mut items: Vec<Recommendation> = best
            .into_iter()
            .map(|(product_id, score)| Recommendation {
                product_id: product_id.to_string(),
                score,
                sources: BTreeSet::from([strategy]),
            })
            .collect();
        sort_recommendations(&mut items);
        items.truncate(limit);
        items
    }

    fn record(&self, cold_start: bool, recommended: usize, confidence: f64) {
        let mut stats = self.stats.lock();
        stats.total_requests += 1;
        if cold_start {
            stats.cold_starts += 1;
        }
        stats.products_recommended += recommended as u64;
        stats.average_confidence.push(confidence);
    }
}

/// Merge strategy lists by product id, summing `score × weight`.
fn merge(lists: &[(Strategy, f64, &Vec<ScoredProduct>)]) -> Vec<Recommendation> {
    let mut merged: HashMap<&str, Recommendation> = HashMap::new();
    for (strategy, weight, products) in lists {
        for product in products.iter() {
            let entry = merged
                .entry(product.product_id.as_str())
                .or_insert_with(|| Recommendation {
                    product_id: product.product_id.clone(),
                    score: 0.0,
                    sources: BTreeSet::new(),
                });
            entry.score += product.score * weight;
            entry.sources.insert(*strategy);
        }
    }

    let mut recommendations: Vec<Recommendation> = merged.into_values().collect();
    sort_recommendations(&mut recommendations);
    recommendations
}

/// Best first; ties broken by product id so output is deterministic.
fn sort_recommendations(items: &mut [Recommendation]) {
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

fn sort_products(items: &mut [ScoredProduct]) {
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

fn confidence_for_history(history_len: usize) -> f64 {
    match history_len {
        0 => 0.3,
        1..=2 => 0.5,
        3..=9 => 0.7,
        _ => 0.9,
    }
}
