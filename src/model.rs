//! Training models: per-category profiles built from labeled documents.
//!
//! Two flavors exist. [`FrequenciesModel`] keeps one merged frequency table
//! per category and is what the Bayesian and TF-IDF strategies fit from.
//! [`DocumentVectorsModel`] keeps every training document verbatim and feeds
//! the k-nearest, decision tree and linear SVM strategies.
//!
//! Profiles are created lazily on the first training call for a category and
//! only ever grow additively, except for [`TokenFrequenciesModel::retain_all`]
//! which feature selection uses to prune the vocabulary.

pub mod frequencies;
pub mod vectors;

use std::collections::BTreeMap;

use ahash::AHashSet;

use crate::category::{Category, Token};
use crate::frequency::FrequencyTable;

pub use frequencies::{FrequenciesModel, FrequencyProfile};
pub use vectors::{DocumentVectorsModel, VectorsProfile};

/// A model that accepts labeled documents.
pub trait Trainable<T: Token> {
    /// Train the model with one document of the given category.
    fn train(&mut self, document: &FrequencyTable<T>, category: &Category);

    /// Train the model with a document given as a token sequence.
    fn train_tokens<I>(&mut self, tokens: I, category: &Category)
    where
        I: IntoIterator<Item = T>,
        Self: Sized,
    {
        self.train(&FrequencyTable::from_tokens(tokens), category);
    }
}

/// Corpus statistics shared by every token frequency based model.
///
/// Category-keyed results are ordered by category name.
pub trait TokenFrequenciesModel<T: Token>: Trainable<T> {
    /// The trained categories.
    fn categories(&self) -> Vec<Category>;

    /// Number of documents trained.
    fn sample_count(&self) -> u64;

    /// Merged token frequencies of each category.
    fn token_frequencies(&self) -> BTreeMap<Category, FrequencyTable<T>>;

    /// Frequency of each token over all documents.
    fn total_token_frequencies(&self) -> FrequencyTable<T>;

    /// Number of documents containing each token.
    fn total_document_frequencies(&self) -> FrequencyTable<T>;

    /// Number of documents in each category.
    fn sample_counts(&self) -> BTreeMap<Category, u64>;

    /// Number of distinct tokens in each category.
    fn token_counts(&self) -> BTreeMap<Category, usize>;

    /// Keep only the tokens contained in `keep`.
    fn retain_all(&mut self, keep: &AHashSet<T>);

    /// Histogram of the corpus-wide token frequencies.
    fn token_histogram(&self) -> FrequencyTable<u64> {
        self.total_token_frequencies().histogram()
    }

    /// Quantiles of the token histogram, see [`FrequencyTable::quantiles`].
    fn quantiles(&self, levels: &[f64]) -> Vec<u64> {
        self.token_histogram().quantiles(levels)
    }
}
