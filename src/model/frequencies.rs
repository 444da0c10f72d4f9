//! Aggregated model: one merged frequency profile per category.

use std::collections::BTreeMap;
use std::hash::Hash;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Token};
use crate::frequency::FrequencyTable;
use crate::model::{TokenFrequenciesModel, Trainable};

/// Frequencies of every token seen in the documents of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct FrequencyProfile<T> {
    /// Number of documents trained.
    document_count: u64,
    /// Occurrences of each token over all documents.
    token_frequencies: FrequencyTable<T>,
    /// Number of documents containing each token.
    document_frequencies: FrequencyTable<T>,
}

impl<T: Token> Default for FrequencyProfile<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> FrequencyProfile<T> {
    /// Create an empty profile.
    pub fn new() -> Self {
        FrequencyProfile {
            document_count: 0,
            token_frequencies: FrequencyTable::new(),
            document_frequencies: FrequencyTable::new(),
        }
    }

    /// Reassemble a profile from its persisted parts.
    pub fn from_parts(
        document_count: u64,
        token_frequencies: FrequencyTable<T>,
        document_frequencies: FrequencyTable<T>,
    ) -> Self {
        FrequencyProfile {
            document_count,
            token_frequencies,
            document_frequencies,
        }
    }

    /// Add one document to the profile.
    pub fn update(&mut self, document: &FrequencyTable<T>) {
        for (token, count) in document.iter() {
            self.token_frequencies.advance_by(token.clone(), count);
            self.document_frequencies.advance(token.clone());
        }
        self.document_count += 1;
    }

    /// Number of documents in the category.
    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    /// Frequency of each token in the category.
    pub fn token_frequencies(&self) -> &FrequencyTable<T> {
        &self.token_frequencies
    }

    /// Number of documents of the category containing each token.
    pub fn document_frequencies(&self) -> &FrequencyTable<T> {
        &self.document_frequencies
    }

    fn retain_all(&mut self, keep: &AHashSet<T>) {
        self.token_frequencies.retain_all(keep);
        self.document_frequencies.retain_all(keep);
    }
}

/// Trainable model that merges the documents of each category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct FrequenciesModel<T> {
    profiles: BTreeMap<Category, FrequencyProfile<T>>,
}

impl<T: Token> Default for FrequenciesModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> FrequenciesModel<T> {
    /// Create an empty model.
    pub fn new() -> Self {
        FrequenciesModel {
            profiles: BTreeMap::new(),
        }
    }

    /// The profile of each category.
    pub fn profiles(&self) -> &BTreeMap<Category, FrequencyProfile<T>> {
        &self.profiles
    }

    /// The profile of one category.
    pub fn profile(&self, category: &Category) -> Option<&FrequencyProfile<T>> {
        self.profiles.get(category)
    }

    /// Install a profile, replacing any existing one for the category.
    pub fn insert_profile(&mut self, category: Category, profile: FrequencyProfile<T>) {
        self.profiles.insert(category, profile);
    }
}

impl<T: Token> Trainable<T> for FrequenciesModel<T> {
    fn train(&mut self, document: &FrequencyTable<T>, category: &Category) {
        self.profiles
            .entry(category.clone())
            .or_default()
            .update(document);
    }
}

impl<T: Token> TokenFrequenciesModel<T> for FrequenciesModel<T> {
    fn categories(&self) -> Vec<Category> {
        self.profiles.keys().cloned().collect()
    }

    fn sample_count(&self) -> u64 {
        self.profiles.values().map(|p| p.document_count).sum()
    }

    fn token_frequencies(&self) -> BTreeMap<Category, FrequencyTable<T>> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.token_frequencies.clone()))
            .collect()
    }

    fn total_token_frequencies(&self) -> FrequencyTable<T> {
        let mut total = FrequencyTable::new();
        for profile in self.profiles.values() {
            total.merge(&profile.token_frequencies);
        }
        total
    }

    fn total_document_frequencies(&self) -> FrequencyTable<T> {
        let mut total = FrequencyTable::new();
        for profile in self.profiles.values() {
            total.merge(&profile.document_frequencies);
        }
        total
    }

    fn sample_counts(&self) -> BTreeMap<Category, u64> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.document_count))
            .collect()
    }

    fn token_counts(&self) -> BTreeMap<Category, usize> {
        self.profiles
            .iter()
            .map(|(category, profile)| (category.clone(), profile.token_frequencies.len()))
            .collect()
    }

    fn retain_all(&mut self, keep: &AHashSet<T>) {
        for profile in self.profiles.values_mut() {
            profile.retain_all(keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: &[&str]) -> FrequencyTable<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_profile_created_lazily() {
        let mut model = FrequenciesModel::new();
        assert!(model.categories().is_empty());
        assert_eq!(model.sample_count(), 0);

        model.train(&doc(&["a"]), &Category::new("x"));
        assert_eq!(model.categories(), vec![Category::new("x")]);
        assert_eq!(model.sample_count(), 1);
    }

    #[test]
    fn test_document_and_token_frequencies() {
        let mut model = FrequenciesModel::new();
        let cat = Category::new("cat1");
        model.train(&doc(&["a", "a", "b"]), &cat);
        model.train(&doc(&["a", "c"]), &cat);

        let profile = model.profile(&cat).unwrap();
        assert_eq!(profile.document_count(), 2);
        assert_eq!(profile.token_frequencies().get("a"), 3);
        assert_eq!(profile.document_frequencies().get("a"), 2);
        assert_eq!(profile.document_frequencies().get("b"), 1);
    }

    #[test]
    fn test_corpus_statistics() {
        let mut model = FrequenciesModel::new();
        model.train_tokens(["a", "a", "b"].map(String::from), &Category::new("cat1"));
        model.train_tokens(["b", "c", "c"].map(String::from), &Category::new("cat2"));

        let total = model.total_token_frequencies();
        assert_eq!(total.get("b"), 2);
        assert_eq!(total.total(), 6);

        let df = model.total_document_frequencies();
        assert_eq!(df.get("a"), 1);
        assert_eq!(df.get("b"), 2);

        let counts = model.token_counts();
        assert_eq!(counts[&Category::new("cat1")], 2);
        assert_eq!(model.sample_counts()[&Category::new("cat2")], 1);
    }

    #[test]
    fn test_retain_all() {
        let mut model = FrequenciesModel::new();
        let cat = Category::new("cat1");
        model.train(&doc(&["a", "b", "c"]), &cat);

        let keep: AHashSet<String> = ["b".to_string()].into_iter().collect();
        model.retain_all(&keep);

        let profile = model.profile(&cat).unwrap();
        assert_eq!(profile.token_frequencies().len(), 1);
        assert_eq!(profile.document_frequencies().len(), 1);
        assert_eq!(profile.document_count(), 1);
    }
}
