//! Multinomial naive Bayes over aggregated category profiles.
//!
//! The score of category `c` for a document is
//! `P(c) · Π_t (P(t|c) / P(t))^n(t)` where `n(t)` is the multiplicity of
//! token `t` in the document. A token never seen in `c` falls back to
//! `1 / |vocabulary(c)|`, a token never seen in the corpus to
//! `1 / |vocabulary|`.
//!
//! The product is accumulated in log space. Reported scores are divided by
//! the best score, so the winning category scores 1.0 and products of many
//! small probabilities never underflow to zero.

use std::sync::Arc;

use log::debug;

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, ClassifierFactory, ranked};
use crate::error::Result;
use crate::feature::FeatureSelector;
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::{FrequenciesModel, TokenFrequenciesModel};

/// Factory for Bayesian classifiers.
pub struct BayesianClassifierFactory<T> {
    feature_selector: Option<Arc<dyn FeatureSelector<T>>>,
}

impl<T: Token> Default for BayesianClassifierFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> BayesianClassifierFactory<T> {
    /// Create a Bayesian classifier factory.
    pub fn new() -> Self {
        BayesianClassifierFactory {
            feature_selector: None,
        }
    }

    /// Prune the vocabulary with `selector` before fitting.
    pub fn with_feature_selector<S: FeatureSelector<T> + 'static>(mut self, selector: S) -> Self {
        self.feature_selector = Some(Arc::new(selector));
        self
    }
}

impl<T: Token> ClassifierFactory<T> for BayesianClassifierFactory<T> {
    type Model = FrequenciesModel<T>;

    fn name(&self) -> &str {
        "Bayesian"
    }

    fn build_model(&self) -> FrequenciesModel<T> {
        FrequenciesModel::new()
    }

    fn fit(&self, model: &FrequenciesModel<T>) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        let classifier = BayesianClassifier::from_model(model);
        debug!(
            "Bayesian classifier fitted: {} categories, {} corpus tokens",
            classifier.categories.len(),
            classifier.corpus.len()
        );
        Ok(Box::new(classifier))
    }

    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        self.feature_selector.as_deref()
    }
}

/// Snapshot of the statistics of one category.
#[derive(Debug)]
struct CategoryStatistics<T> {
    category: Category,
    frequencies: FrozenTable<T>,
    log_prior: f64,
    total_tokens: f64,
}

/// Fitted Bayesian classifier.
#[derive(Debug)]
pub struct BayesianClassifier<T> {
    categories: Vec<CategoryStatistics<T>>,
    corpus: FrozenTable<T>,
    corpus_total: f64,
}

impl<T: Token> BayesianClassifier<T> {
    fn from_model(model: &FrequenciesModel<T>) -> Self {
        let document_count = model.sample_count() as f64;
        let categories = model
            .profiles()
            .iter()
            .filter(|(_, profile)| !profile.token_frequencies().is_empty())
            .map(|(category, profile)| CategoryStatistics {
                category: category.clone(),
                frequencies: profile.token_frequencies().clone().freeze(),
                log_prior: (profile.document_count() as f64 / document_count).ln(),
                total_tokens: profile.token_frequencies().total() as f64,
            })
            .collect();
        let corpus = model.total_token_frequencies();
        let corpus_total = corpus.total() as f64;

        BayesianClassifier {
            categories,
            corpus: corpus.freeze(),
            corpus_total,
        }
    }

    /// `ln P(t)`, neutral when the corpus is empty.
    fn log_token_probability(&self, token: &T) -> f64 {
        let frequency = self.corpus.get(token);
        if frequency > 0 {
            (frequency as f64 / self.corpus_total).ln()
        } else if !self.corpus.is_empty() {
            -(self.corpus.len() as f64).ln()
        } else {
            0.0
        }
    }

    /// Unnormalized log scores of every category, in category order.
    pub fn log_scores(&self, document: &FrequencyTable<T>) -> Vec<(Category, f64)> {
        let mut scores: Vec<f64> = self.categories.iter().map(|c| c.log_prior).collect();

        for (token, count) in document.iter() {
            let log_token = self.log_token_probability(token);
            for (score, statistics) in scores.iter_mut().zip(&self.categories) {
                let frequency = statistics.frequencies.get(token);
                let log_conditional = if frequency > 0 {
                    (frequency as f64 / statistics.total_tokens).ln()
                } else {
                    -(statistics.frequencies.len() as f64).ln()
                };
                *score += count as f64 * (log_conditional - log_token);
            }
        }

        self.categories
            .iter()
            .map(|c| c.category.clone())
            .zip(scores)
            .collect()
    }
}

impl<T: Token> Classifier<FrequencyTable<T>> for BayesianClassifier<T> {
    fn candidates(&self, document: &FrequencyTable<T>) -> Vec<ClassificationResult> {
        let scores = self.log_scores(document);
        let best = scores
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);

        ranked(
            scores
                .into_iter()
                .map(|(category, score)| ClassificationResult::new(category, (score - best).exp()))
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "Bayesian"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Trainable;

    fn doc(tokens: &[&str]) -> FrequencyTable<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn fitted(samples: &[(&str, &[&str])]) -> Box<dyn Classifier<FrequencyTable<String>>> {
        let factory = BayesianClassifierFactory::new();
        let mut model = factory.build_model();
        for (category, tokens) in samples {
            model.train(&doc(tokens), &Category::new(*category));
        }
        factory.classifier(&mut model).unwrap()
    }

    #[test]
    fn test_simple_corpus() {
        let classifier = fitted(&[("CAT1", &["a", "a", "b"]), ("CAT2", &["b", "c", "c"])]);
        let best = classifier.classify(&doc(&["a", "a"])).unwrap();
        assert_eq!(best.category, Category::new("CAT1"));
        assert_eq!(best.score, 1.0);

        let best = classifier.classify(&doc(&["c"])).unwrap();
        assert_eq!(best.category, Category::new("CAT2"));
    }

    #[test]
    fn test_one_result_per_category() {
        let classifier = fitted(&[
            ("x", &["a"]),
            ("y", &["b"]),
            ("z", &["c"]),
        ]);
        let candidates = classifier.candidates(&doc(&["a", "unknown"]));
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].category, Category::new("x"));
        assert!(candidates.iter().all(|c| c.score.is_finite()));
    }

    #[test]
    fn test_exclusive_token_favors_category() {
        let classifier = fitted(&[
            ("spam", &["buy", "buy", "cheap"]),
            ("spam", &["buy"]),
            ("ham", &["meeting", "report", "cheap"]),
            ("ham", &["lunch"]),
        ]);
        let candidates = classifier.candidates(&doc(&["buy", "cheap"]));
        let spam = candidates.iter().find(|c| c.category.name() == "spam").unwrap();
        let ham = candidates.iter().find(|c| c.category.name() == "ham").unwrap();
        assert!(spam.score > ham.score);
    }

    #[test]
    fn test_long_document_does_not_underflow() {
        let classifier = fitted(&[("x", &["a", "a", "b"]), ("y", &["c", "d"])]);
        let tokens: Vec<String> = (0..5000).map(|i| format!("rare{i}")).chain(["a".to_string()]).collect();
        let document = FrequencyTable::from_tokens(tokens);

        let candidates = classifier.candidates(&document);
        assert_eq!(candidates[0].category, Category::new("x"));
        assert_eq!(candidates[0].score, 1.0);
        assert!(candidates[1].score < 1.0);
        assert!(candidates[1].score > 0.0);
    }

    #[test]
    fn test_empty_model() {
        let classifier = fitted(&[]);
        assert!(classifier.candidates(&doc(&["a"])).is_empty());
        assert!(classifier.classify(&doc(&["a"])).is_none());
    }

    #[test]
    fn test_empty_category_dropped() {
        let classifier = fitted(&[("x", &["a"]), ("empty", &[])]);
        let candidates = classifier.candidates(&doc(&["a"]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].category, Category::new("x"));
    }

    #[test]
    fn test_snapshot_isolated_from_training() {
        let factory = BayesianClassifierFactory::new();
        let mut model = factory.build_model();
        model.train(&doc(&["a"]), &Category::new("x"));
        model.train(&doc(&["b"]), &Category::new("y"));
        let classifier = factory.classifier(&mut model).unwrap();
        let before = classifier.candidates(&doc(&["b"]));

        for _ in 0..10 {
            model.train(&doc(&["b"]), &Category::new("x"));
        }
        assert_eq!(classifier.candidates(&doc(&["b"])), before);
    }
}
