//! k-nearest neighbour classifier over TF-IDF weighted document vectors.
//!
//! Every training document is kept as its own vector and each query is
//! compared against all of them, so classification cost grows linearly with
//! the training set. This is a known scalability limit of the strategy.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, ClassifierFactory, TfIdfFormula, ranked};
use crate::error::{Result, TaxisError};
use crate::feature::FeatureSelector;
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::{DocumentVectorsModel, TokenFrequenciesModel};
use crate::util::bounded::BoundedSortedList;

/// Factory for kNN classifiers.
pub struct KNearestClassifierFactory<T> {
    k: usize,
    formula: TfIdfFormula,
    feature_selector: Option<Arc<dyn FeatureSelector<T>>>,
}

impl<T: Token> Default for KNearestClassifierFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> KNearestClassifierFactory<T> {
    /// Create a factory with `k = 1` and the standard TF-IDF formula.
    pub fn new() -> Self {
        KNearestClassifierFactory {
            k: 1,
            formula: TfIdfFormula::Standard,
            feature_selector: None,
        }
    }

    /// Set the number of neighbours considered.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Use another weighting formula.
    pub fn with_formula(mut self, formula: TfIdfFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Prune the vocabulary with `selector` before fitting.
    pub fn with_feature_selector<S: FeatureSelector<T> + 'static>(mut self, selector: S) -> Self {
        self.feature_selector = Some(Arc::new(selector));
        self
    }

    /// The number of neighbours considered.
    pub fn k(&self) -> usize {
        self.k
    }
}

impl<T: Token> ClassifierFactory<T> for KNearestClassifierFactory<T> {
    type Model = DocumentVectorsModel<T>;

    fn name(&self) -> &str {
        "kNN"
    }

    fn build_model(&self) -> DocumentVectorsModel<T> {
        DocumentVectorsModel::new()
    }

    fn fit(&self, model: &DocumentVectorsModel<T>) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        if self.k == 0 {
            return Err(TaxisError::invalid_argument("k must be at least 1"));
        }
        let classifier = KNearestClassifier::from_model(model, self.formula, self.k);
        debug!(
            "kNN classifier fitted: k={}, {} stored vectors",
            self.k,
            classifier.samples.len()
        );
        Ok(Box::new(classifier))
    }

    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        self.feature_selector.as_deref()
    }
}

/// A stored training vector with its weights precomputed.
#[derive(Debug)]
struct WeightedSample<T> {
    category: Category,
    weights: AHashMap<T, f64>,
    norm: f64,
}

/// Fitted kNN classifier.
#[derive(Debug)]
pub struct KNearestClassifier<T> {
    samples: Vec<WeightedSample<T>>,
    document_frequencies: FrozenTable<T>,
    document_count: u64,
    formula: TfIdfFormula,
    k: usize,
}

impl<T: Token> KNearestClassifier<T> {
    fn from_model(model: &DocumentVectorsModel<T>, formula: TfIdfFormula, k: usize) -> Self {
        let mut classifier = KNearestClassifier {
            samples: Vec::new(),
            document_frequencies: model.total_document_frequencies().freeze(),
            document_count: model.sample_count(),
            formula,
            k,
        };
        let mut samples = Vec::new();
        for (category, vectors) in model.snapshot() {
            for vector in vectors {
                let weights = classifier.weights(&vector);
                samples.push(WeightedSample {
                    category: category.clone(),
                    norm: Self::squared_norm(&weights),
                    weights,
                });
            }
        }
        classifier.samples = samples;
        classifier
    }

    fn weights(&self, vector: &FrequencyTable<T>) -> AHashMap<T, f64> {
        vector
            .iter()
            .map(|(token, frequency)| {
                let weight = self.formula.weight(
                    frequency,
                    self.document_frequencies.get(token),
                    self.document_count,
                );
                (token.clone(), weight)
            })
            .collect()
    }

    fn squared_norm(weights: &AHashMap<T, f64>) -> f64 {
        weights.values().map(|weight| weight * weight).sum()
    }

    /// Walks the sparser vector and looks tokens up in the other.
    fn dot(a: &AHashMap<T, f64>, b: &AHashMap<T, f64>) -> f64 {
        let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        shorter
            .iter()
            .filter_map(|(token, weight)| longer.get(token).map(|other| weight * other))
            .sum()
    }

    /// Squared Euclidean distance `|a|² + |b|² - 2 a·b` given both squared
    /// norms.
    fn distance(a: &AHashMap<T, f64>, a_norm: f64, b: &AHashMap<T, f64>, b_norm: f64) -> f64 {
        (a_norm + b_norm - 2.0 * Self::dot(a, b)).max(0.0)
    }
}

impl<T: Token> Classifier<FrequencyTable<T>> for KNearestClassifier<T> {
    fn candidates(&self, document: &FrequencyTable<T>) -> Vec<ClassificationResult> {
        let unknown = self.weights(document);
        let unknown_norm = Self::squared_norm(&unknown);
        let mut nearest = BoundedSortedList::new(self.k, |a: &(usize, f64), b: &(usize, f64)| {
            a.1.total_cmp(&b.1)
        });
        for (index, sample) in self.samples.iter().enumerate() {
            nearest.push((
                index,
                Self::distance(&sample.weights, sample.norm, &unknown, unknown_norm),
            ));
        }

        let mut votes: BTreeMap<&Category, usize> = BTreeMap::new();
        for (index, _) in nearest.as_slice() {
            *votes.entry(&self.samples[*index].category).or_insert(0) += 1;
        }
        ranked(
            votes
                .into_iter()
                .map(|(category, count)| {
                    ClassificationResult::new(category.clone(), count as f64 / self.k as f64)
                })
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "kNN"
    }
}
