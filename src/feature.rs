//! Feature selection: corpus-wide vocabulary pruning.
//!
//! A selector inspects a trained model and returns the tokens worth keeping.
//! [`ClassifierFactory::classifier`](crate::classifier::ClassifierFactory::classifier)
//! then prunes every profile of the model down to that set before fitting.

pub mod frequency;
pub mod tfidf;

use std::sync::Arc;

use ahash::AHashSet;

use crate::category::Token;
use crate::model::TokenFrequenciesModel;

pub use frequency::{FrequencyFeatureSelector, FrequencyKind};
pub use tfidf::TfIdfFeatureSelector;

/// Chooses the tokens a classifier is fitted on.
pub trait FeatureSelector<T: Token>: Send + Sync {
    /// The tokens of `model` to keep.
    fn select(&self, model: &dyn TokenFrequenciesModel<T>) -> AHashSet<T>;

    /// Short description appended to the strategy name, e.g. `[tfidf:1000]`.
    fn describe(&self) -> String;
}

impl<T, S> FeatureSelector<T> for Arc<S>
where
    T: Token,
    S: FeatureSelector<T> + ?Sized,
{
    fn select(&self, model: &dyn TokenFrequenciesModel<T>) -> AHashSet<T> {
        (**self).select(model)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
