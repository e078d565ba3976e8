//! Cross-sell and up-sell catalogs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Product relationships used for cross-sell (complements) and up-sell
/// (premium upgrades). Scores are base scores before the configured boosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductCatalog {
    pub cross_sell: HashMap<String, Vec<(String, f64)>>,
    pub up_sell: HashMap<String, Vec<(String, f64)>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cross_sell(mut self, product_id: &str, complements: &[(&str, f64)]) -> Self {
        self.cross_sell
            .insert(product_id.to_string(), to_owned(complements));
        self
    }

    pub fn with_up_sell(mut self, product_id: &str, upgrades: &[(&str, f64)]) -> Self {
        self.up_sell.insert(product_id.to_string(), to_owned(upgrades));
        self
    }

    /// Catalog matching [`super::StaticSimilarityProvider::sample`].
    pub fn sample() -> Self {
        Self::new()
            .with_cross_sell("laptop", &[("laptop_bag", 0.7), ("usb_hub", 0.6), ("mouse", 0.5)])
            .with_cross_sell("mouse", &[("mouse_pad", 0.6), ("keyboard", 0.5)])
            .with_cross_sell("keyboard", &[("wrist_rest", 0.6), ("mouse", 0.5)])
            .with_cross_sell("monitor", &[("monitor_arm", 0.7), ("hdmi_cable", 0.5)])
            .with_cross_sell("headphones", &[("headphone_stand", 0.5), ("microphone", 0.4)])
            .with_up_sell("laptop", &[("laptop_pro", 0.6)])
            .with_up_sell("mouse", &[("ergonomic_mouse", 0.5)])
            .with_up_sell("monitor", &[("monitor_4k", 0.6)])
            .with_up_sell("headphones", &[("noise_cancelling_headphones", 0.55)])
            .with_up_sell("office_chair", &[("ergonomic_chair", 0.5)])
    }
}

fn to_owned(items: &[(&str, f64)]) -> Vec<(String, f64)> {
    items
        .iter()
        .map(|(id, score)| (id.to_string(), *score))
        .collect()
}
