//! Sparse TF-IDF vectors over analyzed text.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::error::Result;

/// Term → weight map with the vector operations clustering needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: AHashMap<String, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .map(|(term, weight)| weight * large.get(term))
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    /// Cosine similarity; 0 when either vector is all zeros.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let norms = self.norm() * other.norm();
        if norms == 0.0 {
            0.0
        } else {
            self.dot(other) / norms
        }
    }

    /// Arithmetic mean of the given vectors.
    pub fn mean<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a SparseVector>,
    {
        let mut sum: AHashMap<String, f64> = AHashMap::new();
        let mut count = 0usize;
        for vector in vectors {
            count += 1;
            for (term, weight) in &vector.weights {
                *sum.entry(term.clone()).or_insert(0.0) += weight;
            }
        }
        if count > 0 {
            for weight in sum.values_mut() {
                *weight /= count as f64;
            }
        }
        Self { weights: sum }
    }

    /// The `k` heaviest terms, ties broken alphabetically.
    pub fn top_terms(&self, k: usize) -> Vec<String> {
        let mut terms: Vec<(&String, &f64)> = self.weights.iter().collect();
        terms.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        terms
            .into_iter()
            .take(k)
            .map(|(term, _)| term.clone())
            .collect()
    }

    /// Ordered copy for serialization.
    pub fn to_sorted_map(&self) -> BTreeMap<String, f64> {
        self.weights
            .iter()
            .map(|(term, weight)| (term.clone(), *weight))
            .collect()
    }
}

/// TF-IDF vectorizer fitted on a batch of documents.
///
/// `idf = ln((N + 1) / (df + 1)) + 1`; term frequency is normalized by
/// document length.
pub struct TfIdfVectorizer {
    idf: AHashMap<String, f64>,
    n_documents: usize,
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.idf.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            idf: AHashMap::new(),
            n_documents: 0,
            analyzer,
        }
    }

    /// Compute document frequencies over `documents`.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        self.n_documents = documents.len();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let unique: HashSet<String> = self.analyzer.terms(doc.as_ref())?.into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = self.n_documents as f64;
        self.idf = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let idf = ((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0;
                (term, idf)
            })
            .collect();

        Ok(())
    }

    /// Vectorize a document. Terms unseen during fitting are dropped.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        let terms = self.analyzer.terms(document)?;
        if terms.is_empty() {
            return Ok(SparseVector::new());
        }

        let mut counts: AHashMap<String, f64> = AHashMap::new();
        for term in &terms {
            if self.idf.contains_key(term) {
                *counts.entry(term.clone()).or_insert(0.0) += 1.0;
            }
        }

        let length = terms.len() as f64;
        let weights = counts
            .into_iter()
            .map(|(term, count)| {
                let idf = self.idf.get(&term).copied().unwrap_or(0.0);
                (term, count / length * idf)
            })
            .collect();

        Ok(SparseVector { weights })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }
}
