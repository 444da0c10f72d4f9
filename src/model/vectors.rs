//! Vector model: every training document retained per category.
//!
//! All vectors stay in memory; the k-nearest strategy scans every one of
//! them per query.

use std::collections::BTreeMap;
use std::hash::Hash;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Token};
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::{TokenFrequenciesModel, Trainable};

/// The document vectors of one category, in training order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct VectorsProfile<T> {
    vectors: Vec<FrequencyTable<T>>,
}

impl<T: Token> Default for VectorsProfile<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> VectorsProfile<T> {
    /// Create an empty profile.
    pub fn new() -> Self {
        VectorsProfile {
            vectors: Vec::new(),
        }
    }

    /// Create a profile holding the given vectors.
    pub fn with_vectors(vectors: Vec<FrequencyTable<T>>) -> Self {
        VectorsProfile { vectors }
    }

    /// Append one document vector.
    pub fn update(&mut self, document: &FrequencyTable<T>) {
        self.vectors.push(document.clone());
    }

    /// The document vectors.
    pub fn document_vectors(&self) -> &[FrequencyTable<T>] {
        &self.vectors
    }

    /// Number of documents containing each token.
    pub fn document_frequencies(&self) -> FrequencyTable<T> {
        let mut frequencies = FrequencyTable::new();
        for vector in &self.vectors {
            for token in vector.tokens() {
                frequencies.advance(token.clone());
            }
        }
        frequencies
    }

    /// Merged token frequencies of all vectors.
    pub fn token_frequencies(&self) -> FrequencyTable<T> {
        let mut frequencies = FrequencyTable::new();
        for vector in &self.vectors {
            frequencies.merge(vector);
        }
        frequencies
    }
}

/// Trainable model that keeps every document vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct DocumentVectorsModel<T> {
    profiles: BTreeMap<Category, VectorsProfile<T>>,
}

impl<T: Token> Default for DocumentVectorsModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> DocumentVectorsModel<T> {
    /// Create an empty model.
    pub fn new() -> Self {
        DocumentVectorsModel {
            profiles: BTreeMap::new(),
        }
    }

    /// The profile of each category.
    pub fn profiles(&self) -> &BTreeMap<Category, VectorsProfile<T>> {
        &self.profiles
    }

    /// Install a profile, replacing any existing one for the category.
    pub fn insert_profile(&mut self, category: Category, profile: VectorsProfile<T>) {
        self.profiles.insert(category, profile);
    }

    /// Number of documents of each category containing each token.
    pub fn document_frequencies(&self) -> BTreeMap<Category, FrequencyTable<T>> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.document_frequencies()))
            .collect()
    }

    /// Frozen copies of every document vector, per category.
    ///
    /// Categories whose vectors are all empty are left out.
    pub fn snapshot(&self) -> BTreeMap<Category, Vec<FrozenTable<T>>> {
        self.profiles
            .iter()
            .filter(|(_, profile)| profile.vectors.iter().any(|v| !v.is_empty()))
            .map(|(category, profile)| {
                let vectors = profile
                    .vectors
                    .iter()
                    .map(|v| v.clone().freeze())
                    .collect();
                (category.clone(), vectors)
            })
            .collect()
    }
}

impl<T: Token> Trainable<T> for DocumentVectorsModel<T> {
    fn train(&mut self, document: &FrequencyTable<T>, category: &Category) {
        self.profiles
            .entry(category.clone())
            .or_default()
            .update(document);
    }
}

impl<T: Token> TokenFrequenciesModel<T> for DocumentVectorsModel<T> {
    fn categories(&self) -> Vec<Category> {
        self.profiles.keys().cloned().collect()
    }

    fn sample_count(&self) -> u64 {
        self.profiles.values().map(|p| p.vectors.len() as u64).sum()
    }

    fn token_frequencies(&self) -> BTreeMap<Category, FrequencyTable<T>> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.token_frequencies()))
            .collect()
    }

    fn total_token_frequencies(&self) -> FrequencyTable<T> {
        let mut total = FrequencyTable::new();
        for vector in self.profiles.values().flat_map(|p| p.vectors.iter()) {
            total.merge(vector);
        }
        total
    }

    fn total_document_frequencies(&self) -> FrequencyTable<T> {
        let mut total = FrequencyTable::new();
        for vector in self.profiles.values().flat_map(|p| p.vectors.iter()) {
            for token in vector.tokens() {
                total.advance(token.clone());
            }
        }
        total
    }

    fn sample_counts(&self) -> BTreeMap<Category, u64> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.vectors.len() as u64))
            .collect()
    }

    fn token_counts(&self) -> BTreeMap<Category, usize> {
        self.profiles
            .iter()
            .map(|(category, profile)| {
                let distinct: AHashSet<&T> =
                    profile.vectors.iter().flat_map(|v| v.tokens()).collect();
                (category.clone(), distinct.len())
            })
            .collect()
    }

    fn retain_all(&mut self, keep: &AHashSet<T>) {
        for vector in self.profiles.values_mut().flat_map(|p| p.vectors.iter_mut()) {
            vector.retain_all(keep);
        }
    }
}
