//! C4.5 style decision tree over token presence.
//!
//! Each internal node tests whether one token occurs in the document more
//! than `cut` times. The tested token is the one with the highest
//! information gain among the documents that reach the node; growth stops
//! when no token gains more than [`GAIN_THRESHOLD`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, ClassifierFactory};
use crate::error::Result;
use crate::feature::FeatureSelector;
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::DocumentVectorsModel;

/// Minimum information gain for a node to be split.
pub const GAIN_THRESHOLD: f64 = 1e-5;

/// Factory for decision tree classifiers.
pub struct C45ClassifierFactory<T> {
    feature_selector: Option<Arc<dyn FeatureSelector<T>>>,
}

impl<T: Token> Default for C45ClassifierFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> C45ClassifierFactory<T> {
    /// Create a decision tree factory.
    pub fn new() -> Self {
        C45ClassifierFactory {
            feature_selector: None,
        }
    }

    /// Prune the vocabulary with `selector` before fitting.
    pub fn with_feature_selector<S: FeatureSelector<T> + 'static>(mut self, selector: S) -> Self {
        self.feature_selector = Some(Arc::new(selector));
        self
    }

    /// Grow a tree from the document vectors of `model`.
    ///
    /// Returns `None` when the model holds no usable document.
    pub fn build_tree(&self, model: &DocumentVectorsModel<T>) -> Option<DecisionTree<T>> {
        grow(&model.snapshot())
    }
}

impl<T: Token> ClassifierFactory<T> for C45ClassifierFactory<T> {
    type Model = DocumentVectorsModel<T>;

    fn name(&self) -> &str {
        "C4.5"
    }

    fn build_model(&self) -> DocumentVectorsModel<T> {
        DocumentVectorsModel::new()
    }

    fn fit(&self, model: &DocumentVectorsModel<T>) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        let tree = self.build_tree(model);
        if let Some(tree) = &tree {
            debug!(
                "decision tree grown: depth {}, {} leaves",
                tree.depth(),
                tree.leaf_count()
            );
        }
        Ok(Box::new(C45Classifier { tree }))
    }

    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        self.feature_selector.as_deref()
    }
}

/// A binary decision tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionTree<T> {
    /// Terminal node predicting one category.
    Leaf { category: Category },
    /// Test on the frequency of `feature`.
    Internal {
        feature: T,
        cut: u64,
        /// Followed when the frequency is at most `cut`.
        absent: Box<DecisionTree<T>>,
        /// Followed when the frequency exceeds `cut`.
        present: Box<DecisionTree<T>>,
    },
}

impl<T: Token> DecisionTree<T> {
    /// Walk from this node to the leaf reached by `document`.
    pub fn decide(&self, document: &FrequencyTable<T>) -> &Category {
        let mut node = self;
        loop {
            match node {
                DecisionTree::Leaf { category } => return category,
                DecisionTree::Internal {
                    feature,
                    cut,
                    absent,
                    present,
                } => {
                    node = if document.get(feature) <= *cut {
                        absent
                    } else {
                        present
                    };
                }
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 0,
            DecisionTree::Internal {
                absent, present, ..
            } => 1 + absent.depth().max(present.depth()),
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 1,
            DecisionTree::Internal {
                absent, present, ..
            } => absent.leaf_count() + present.leaf_count(),
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, level: usize, label: &str) -> fmt::Result {
        write!(f, "{:indent$}{label}", "", indent = level * 2)?;
        match self {
            DecisionTree::Leaf { category } => writeln!(f, "{category}"),
            DecisionTree::Internal {
                feature,
                cut,
                absent,
                present,
            } => {
                writeln!(f, "{feature:?} > {cut}")?;
                absent.fmt_node(f, level + 1, "no: ")?;
                present.fmt_node(f, level + 1, "yes: ")
            }
        }
    }
}

impl<T: Token> fmt::Display for DecisionTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, 0, "")
    }
}

type Subsets<T> = BTreeMap<Category, Vec<FrozenTable<T>>>;

/// Binary entropy, with `H(0) = H(1) = 0`.
fn entropy(hits: u64, total: u64) -> f64 {
    if total == 0 || hits == 0 || hits == total {
        return 0.0;
    }
    let p = hits as f64 / total as f64;
    let q = 1.0 - p;
    -p * p.ln() - q * q.ln()
}

fn grow<T: Token>(subsets: &Subsets<T>) -> Option<DecisionTree<T>> {
    let majority = majority(subsets)?;

    match best_feature(subsets) {
        Some(feature) => {
            let (absent, present) = partition(subsets, &feature);
            match (grow(&absent), grow(&present)) {
                (Some(absent), Some(present)) => Some(DecisionTree::Internal {
                    feature,
                    cut: 0,
                    absent: Box::new(absent),
                    present: Box::new(present),
                }),
                _ => Some(DecisionTree::Leaf { category: majority }),
            }
        }
        None => Some(DecisionTree::Leaf { category: majority }),
    }
}

/// The category with the most samples; the smallest name wins ties.
fn majority<T>(subsets: &Subsets<T>) -> Option<Category> {
    let mut best: Option<(&Category, usize)> = None;
    for (category, vectors) in subsets {
        if best.is_none_or(|(_, count)| vectors.len() > count) {
            best = Some((category, vectors.len()));
        }
    }
    best.map(|(category, _)| category.clone())
}

/// The token with the highest information gain above the threshold.
fn best_feature<T: Token>(subsets: &Subsets<T>) -> Option<T> {
    let mut category_frequencies = Vec::with_capacity(subsets.len());
    let mut total_frequencies = FrequencyTable::new();
    let mut sample_count = 0u64;
    for vectors in subsets.values() {
        let mut frequencies = FrequencyTable::new();
        for vector in vectors {
            for token in vector.tokens() {
                frequencies.advance(token.clone());
            }
        }
        total_frequencies.merge(&frequencies);
        sample_count += vectors.len() as u64;
        category_frequencies.push((vectors.len() as u64, frequencies));
    }

    let mut best: Option<(&T, f64)> = None;
    for (feature, frequency) in total_frequencies.sorted_entries() {
        let split: f64 = category_frequencies
            .iter()
            .map(|(count, frequencies)| entropy(frequencies.get(feature), *count) * *count as f64)
            .sum();
        let gain = entropy(frequency, sample_count) - split / sample_count as f64;
        if best.is_none_or(|(_, max)| gain > max) {
            best = Some((feature, gain));
        }
    }
    best.filter(|(_, gain)| *gain > GAIN_THRESHOLD)
        .map(|(feature, _)| feature.clone())
}

/// Split every category subset on the presence of `feature`, dropping
/// categories left without samples.
fn partition<T: Token>(subsets: &Subsets<T>, feature: &T) -> (Subsets<T>, Subsets<T>) {
    let mut absent = BTreeMap::new();
    let mut present = BTreeMap::new();
    for (category, vectors) in subsets {
        let (with, without): (Vec<_>, Vec<_>) =
            vectors.iter().cloned().partition(|v| v.get(feature) > 0);
        if !without.is_empty() {
            absent.insert(category.clone(), without);
        }
        if !with.is_empty() {
            present.insert(category.clone(), with);
        }
    }
    (absent, present)
}

/// Fitted decision tree classifier.
#[derive(Debug)]
pub struct C45Classifier<T> {
    tree: Option<DecisionTree<T>>,
}

impl<T: Token> C45Classifier<T> {
    /// The fitted tree, `None` for an untrained model.
    pub fn tree(&self) -> Option<&DecisionTree<T>> {
        self.tree.as_ref()
    }
}

impl<T: Token> Classifier<FrequencyTable<T>> for C45Classifier<T> {
    fn candidates(&self, document: &FrequencyTable<T>) -> Vec<ClassificationResult> {
        match &self.tree {
            Some(tree) => vec![ClassificationResult::new(tree.decide(document).clone(), 1.0)],
            None => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "C4.5"
    }
}
