//! Linear SVM strategy backed by an external solver.
//!
//! The crate only prepares the problem: every training document becomes a
//! sparse TF-IDF vector, L2-normalized, with 1-based feature indices sorted
//! in ascending order, labelled with the index of its category. Solving the
//! optimization problem is delegated to a [`LinearSolver`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, ClassifierFactory, TfIdfFormula};
use crate::error::Result;
use crate::feature::FeatureSelector;
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::{DocumentVectorsModel, TokenFrequenciesModel};

/// One non-zero entry of a sparse feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureNode {
    /// 1-based feature index.
    pub index: usize,
    pub value: f64,
}

impl FeatureNode {
    pub fn new(index: usize, value: f64) -> Self {
        FeatureNode { index, value }
    }
}

/// A labelled training problem in sparse form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Category index of each sample.
    pub labels: Vec<f64>,
    /// Feature vector of each sample, sorted by index.
    pub features: Vec<Vec<FeatureNode>>,
    /// Number of distinct features.
    pub dimension: usize,
}

impl Problem {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// External linear classification solver.
pub trait LinearSolver: Send + Sync {
    /// Solve `problem`, returning a model that predicts labels.
    fn train(&self, problem: &Problem) -> Result<Box<dyn LinearModel>>;
}

/// A solved linear model.
pub trait LinearModel: Send + Sync {
    /// Predicted label of a feature vector.
    fn predict(&self, features: &[FeatureNode]) -> f64;
}

/// Factory for SVM classifiers.
pub struct SvmClassifierFactory<T> {
    solver: Arc<dyn LinearSolver>,
    formula: TfIdfFormula,
    feature_selector: Option<Arc<dyn FeatureSelector<T>>>,
}

impl<T: Token> SvmClassifierFactory<T> {
    /// Create a factory delegating to `solver`.
    pub fn new<S: LinearSolver + 'static>(solver: S) -> Self {
        SvmClassifierFactory {
            solver: Arc::new(solver),
            formula: TfIdfFormula::Standard,
            feature_selector: None,
        }
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

    /// Vectorize the training documents of `model`.
    ///
    /// Returns the problem, the category of each label index and the feature
    /// index assigned to each token.
    pub fn problem(&self, model: &DocumentVectorsModel<T>) -> (Problem, Vec<Category>, AHashMap<T, usize>) {
        let encoder = Encoder {
            indices: AHashMap::new(),
            document_frequencies: model.total_document_frequencies().freeze(),
            document_count: model.sample_count(),
            formula: self.formula,
        };
        let snapshot: BTreeMap<Category, Vec<FrozenTable<T>>> = model.snapshot();
        encoder.encode_problem(snapshot)
    }
}

impl<T: Token> fmt::Debug for SvmClassifierFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvmClassifierFactory")
            .field("formula", &self.formula)
            .finish_non_exhaustive()
    }
}

impl<T: Token> ClassifierFactory<T> for SvmClassifierFactory<T> {
    type Model = DocumentVectorsModel<T>;

    fn name(&self) -> &str {
        "SVM"
    }

    fn build_model(&self) -> DocumentVectorsModel<T> {
        DocumentVectorsModel::new()
    }

    fn fit(&self, model: &DocumentVectorsModel<T>) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        let (problem, categories, indices) = self.problem(model);
        let solved = if problem.is_empty() {
            None
        } else {
            debug!(
                "solving SVM problem: {} samples, {} features, {} categories",
                problem.len(),
                problem.dimension,
                categories.len()
            );
            Some(self.solver.train(&problem)?)
        };
        Ok(Box::new(SvmClassifier {
            model: solved,
            categories,
            encoder: Encoder {
                indices,
                document_frequencies: model.total_document_frequencies().freeze(),
                document_count: model.sample_count(),
                formula: self.formula,
            },
        }))
    }

    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        self.feature_selector.as_deref()
    }
}

/// Turns frequency tables into normalized sparse vectors.
struct Encoder<T> {
    indices: AHashMap<T, usize>,
    document_frequencies: FrozenTable<T>,
    document_count: u64,
    formula: TfIdfFormula,
}

impl<T: Token> Encoder<T> {
    fn encode_problem(
        mut self,
        snapshot: BTreeMap<Category, Vec<FrozenTable<T>>>,
    ) -> (Problem, Vec<Category>, AHashMap<T, usize>) {
        let mut problem = Problem::default();
        let mut categories = Vec::with_capacity(snapshot.len());
        for (label, (category, vectors)) in snapshot.into_iter().enumerate() {
            for vector in vectors {
                let features = self.encode_training(&vector);
                problem.labels.push(label as f64);
                problem.features.push(features);
            }
            categories.push(category);
        }
        problem.dimension = self.indices.len();
        (problem, categories, self.indices)
    }

    /// Encode a training vector, assigning indices to tokens seen first.
    fn encode_training(&mut self, vector: &FrequencyTable<T>) -> Vec<FeatureNode> {
        let mut features = Vec::with_capacity(vector.len());
        for (token, frequency) in vector.sorted_entries() {
            let next = self.indices.len() + 1;
            let index = *self.indices.entry(token.clone()).or_insert(next);
            features.push(FeatureNode::new(index, self.weight(token, frequency)));
        }
        normalize(&mut features);
        features
    }

    /// Encode a query vector; tokens unseen in training are dropped.
    fn encode(&self, vector: &FrequencyTable<T>) -> Vec<FeatureNode> {
        let mut features: Vec<FeatureNode> = vector
            .iter()
            .filter_map(|(token, frequency)| {
                self.indices
                    .get(token)
                    .map(|&index| FeatureNode::new(index, self.weight(token, frequency)))
            })
            .collect();
        normalize(&mut features);
        features
    }

    fn weight(&self, token: &T, frequency: u64) -> f64 {
        self.formula.weight(
            frequency,
            self.document_frequencies.get(token),
            self.document_count,
        )
    }
}

/// Scale to unit length and sort by index. A zero vector is left as is.
fn normalize(features: &mut [FeatureNode]) {
    let norm = features.iter().map(|f| f.value * f.value).sum::<f64>().sqrt();
    if norm > 0.0 {
        for feature in features.iter_mut() {
            feature.value /= norm;
        }
    }
    features.sort_unstable_by_key(|f| f.index);
}

/// Fitted SVM classifier.
pub struct SvmClassifier<T> {
    model: Option<Box<dyn LinearModel>>,
    categories: Vec<Category>,
    encoder: Encoder<T>,
}

impl<T: Token> SvmClassifier<T> {
    /// The category of each label index.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

impl<T: Token> Classifier<FrequencyTable<T>> for SvmClassifier<T> {
    fn candidates(&self, document: &FrequencyTable<T>) -> Vec<ClassificationResult> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let prediction = (model.predict(&self.encoder.encode(document)) + 0.5).floor();
        if prediction >= 0.0 && (prediction as usize) < self.categories.len() {
            vec![ClassificationResult::new(
                self.categories[prediction as usize].clone(),
                1.0,
            )]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &str {
        "SVM"
    }
}
