//! Classification strategies.
//!
//! Every algorithm is one [`ClassifierFactory`]: it builds an empty training
//! model and fits a [`Classifier`] from a trained model. Fitting copies the
//! statistics it needs, so a fitted classifier is immutable, shareable across
//! threads and unaffected by further training of its source model.
//!
//! [`Strategy`] erases the model type so that heterogeneous algorithms can be
//! trained and compared side by side by the validator.
//!
//! # Example
//!
//! ```
//! use taxis::category::Category;
//! use taxis::classifier::{BayesianClassifierFactory, Classifier, ClassifierFactory};
//! use taxis::frequency::FrequencyTable;
//! use taxis::model::Trainable;
//!
//! let factory = BayesianClassifierFactory::new();
//! let mut model = factory.build_model();
//! model.train_tokens(["a", "a", "b"].map(String::from), &Category::new("cat1"));
//! model.train_tokens(["b", "c", "c"].map(String::from), &Category::new("cat2"));
//!
//! let classifier = factory.classifier(&mut model).unwrap();
//! let document = FrequencyTable::from_tokens(["a", "a"].map(String::from));
//! let best = classifier.classify(&document).unwrap();
//! assert_eq!(best.category, Category::new("cat1"));
//! ```

pub mod bayes;
pub mod c45;
pub mod formula;
pub mod knn;
pub mod svm;
pub mod tfidf;

use std::sync::Arc;

use log::debug;

use crate::category::{Category, ClassificationResult, Token};
use crate::error::Result;
use crate::feature::FeatureSelector;
use crate::frequency::FrequencyTable;
use crate::model::{TokenFrequenciesModel, Trainable};

pub use bayes::BayesianClassifierFactory;
pub use c45::{C45ClassifierFactory, DecisionTree};
pub use formula::TfIdfFormula;
pub use knn::KNearestClassifierFactory;
pub use svm::{FeatureNode, LinearModel, LinearSolver, Problem, SvmClassifierFactory};
pub use tfidf::TfIdfClassifierFactory;

/// A fitted classifier.
pub trait Classifier<D: ?Sized>: Send + Sync {
    /// Score the candidate categories of `data`, best first.
    ///
    /// An untrained model yields an empty list.
    fn candidates(&self, data: &D) -> Vec<ClassificationResult>;

    /// The best candidate, if any.
    fn classify(&self, data: &D) -> Option<ClassificationResult> {
        self.candidates(data).into_iter().min()
    }

    /// The `n` best candidates.
    fn top(&self, data: &D, n: usize) -> Vec<ClassificationResult> {
        let mut candidates = self.candidates(data);
        candidates.sort();
        candidates.truncate(n);
        candidates
    }

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// An algorithm: how to train a model and how to fit a classifier from it.
pub trait ClassifierFactory<T: Token>: Send + Sync {
    /// The training model the algorithm fits from.
    type Model: TokenFrequenciesModel<T> + Send;

    /// Name of the algorithm.
    fn name(&self) -> &str;

    /// Create an empty training model.
    fn build_model(&self) -> Self::Model;

    /// Fit a classifier from a snapshot of `model`.
    fn fit(&self, model: &Self::Model) -> Result<Box<dyn Classifier<FrequencyTable<T>>>>;

    /// The feature selector applied before fitting, if any.
    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        None
    }

    /// Apply feature selection to `model`, then fit a classifier from it.
    ///
    /// Selection prunes the model in place and cannot be undone without
    /// retraining.
    fn classifier(&self, model: &mut Self::Model) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        if let Some(selector) = self.feature_selector() {
            let selected = selector.select(&*model);
            debug!(
                "{}: {} keeps {} features",
                self.name(),
                selector.describe(),
                selected.len()
            );
            model.retain_all(&selected);
        }
        self.fit(model)
    }

    /// Name of the algorithm including its feature selector.
    fn describe(&self) -> String {
        match self.feature_selector() {
            Some(selector) => format!("{}{}", self.name(), selector.describe()),
            None => self.name().to_string(),
        }
    }
}

/// A trainable classification strategy over data of type `D`.
pub trait Strategy<D>: Send + Sync {
    /// Name of the strategy, used to key evaluation results.
    fn label(&self) -> String;

    /// Train a fresh model on `samples` and fit a classifier from it.
    fn train_classifier<'a>(
        &self,
        samples: &mut dyn Iterator<Item = (&'a D, &'a Category)>,
    ) -> Result<Box<dyn Classifier<D>>>
    where
        D: 'a;
}

impl<T, F> Strategy<FrequencyTable<T>> for F
where
    T: Token,
    F: ClassifierFactory<T>,
{
    fn label(&self) -> String {
        self.describe()
    }

    fn train_classifier<'a>(
        &self,
        samples: &mut dyn Iterator<Item = (&'a FrequencyTable<T>, &'a Category)>,
    ) -> Result<Box<dyn Classifier<FrequencyTable<T>>>>
    where
        FrequencyTable<T>: 'a,
    {
        let mut model = self.build_model();
        for (document, category) in samples {
            model.train(document, category);
        }
        self.classifier(&mut model)
    }
}

impl<D, C> Classifier<D> for Arc<C>
where
    D: ?Sized,
    C: Classifier<D> + ?Sized,
{
    fn candidates(&self, data: &D) -> Vec<ClassificationResult> {
        (**self).candidates(data)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<D, C> Classifier<D> for Box<C>
where
    D: ?Sized,
    C: Classifier<D> + ?Sized,
{
    fn candidates(&self, data: &D) -> Vec<ClassificationResult> {
        (**self).candidates(data)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Sort results best first.
pub(crate) fn ranked(mut results: Vec<ClassificationResult>) -> Vec<ClassificationResult> {
    results.sort();
    results
}
