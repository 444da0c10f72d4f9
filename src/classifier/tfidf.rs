//! Vector space classifier: squared cosine similarity between the TF-IDF
//! vector of a document and the TF-IDF vector of each category profile.

use std::sync::Arc;

use log::debug;

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, ClassifierFactory, TfIdfFormula, ranked};
use crate::error::Result;
use crate::feature::FeatureSelector;
use crate::frequency::{FrequencyTable, FrozenTable};
use crate::model::{FrequenciesModel, TokenFrequenciesModel};

/// Factory for TF-IDF classifiers.
pub struct TfIdfClassifierFactory<T> {
    formula: TfIdfFormula,
    feature_selector: Option<Arc<dyn FeatureSelector<T>>>,
}

impl<T: Token> Default for TfIdfClassifierFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> TfIdfClassifierFactory<T> {
    /// Create a factory using the standard TF-IDF formula.
    pub fn new() -> Self {
        TfIdfClassifierFactory {
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

    /// The weighting formula.
    pub fn formula(&self) -> TfIdfFormula {
        self.formula
    }
}

impl<T: Token> ClassifierFactory<T> for TfIdfClassifierFactory<T> {
    type Model = FrequenciesModel<T>;

    fn name(&self) -> &str {
        "TF-IDF"
    }

    fn build_model(&self) -> FrequenciesModel<T> {
        FrequenciesModel::new()
    }

    fn fit(&self, model: &FrequenciesModel<T>) -> Result<Box<dyn Classifier<FrequencyTable<T>>>> {
        let classifier = TfIdfClassifier::from_model(model, self.formula);
        debug!(
            "TF-IDF classifier fitted: {} categories over {} documents",
            classifier.profiles.len(),
            classifier.document_count
        );
        Ok(Box::new(classifier))
    }

    fn feature_selector(&self) -> Option<&dyn FeatureSelector<T>> {
        self.feature_selector.as_deref()
    }
}

/// One category vector with its precomputed squared norm.
#[derive(Debug)]
struct CategoryVector<T> {
    category: Category,
    frequencies: FrozenTable<T>,
    norm: f64,
}

/// Fitted TF-IDF classifier.
#[derive(Debug)]
pub struct TfIdfClassifier<T> {
    profiles: Vec<CategoryVector<T>>,
    document_frequencies: FrozenTable<T>,
    document_count: u64,
    formula: TfIdfFormula,
}

impl<T: Token> TfIdfClassifier<T> {
    fn from_model(model: &FrequenciesModel<T>, formula: TfIdfFormula) -> Self {
        let document_frequencies = model.total_document_frequencies().freeze();
        let document_count = model.sample_count();

        let mut classifier = TfIdfClassifier {
            profiles: Vec::new(),
            document_frequencies,
            document_count,
            formula,
        };
        classifier.profiles = model
            .profiles()
            .iter()
            .filter(|(_, profile)| !profile.token_frequencies().is_empty())
            .map(|(category, profile)| {
                let frequencies = profile.token_frequencies().clone().freeze();
                let norm = classifier.squared_norm(&frequencies);
                CategoryVector {
                    category: category.clone(),
                    frequencies,
                    norm,
                }
            })
            .collect();
        classifier
    }

    fn weight(&self, token: &T, frequency: u64) -> f64 {
        self.formula.weight(
            frequency,
            self.document_frequencies.get(token),
            self.document_count,
        )
    }

    /// Sum of squared weights over every token of `vector`.
    fn squared_norm(&self, vector: &FrequencyTable<T>) -> f64 {
        vector
            .iter()
            .map(|(token, frequency)| {
                let weight = self.weight(token, frequency);
                weight * weight
            })
            .sum()
    }

    /// Weighted dot product, iterating the sparser vector.
    fn dot(&self, a: &FrequencyTable<T>, b: &FrequencyTable<T>) -> f64 {
        let (shorter, longer) = FrequencyTable::sparser_first(a, b);
        shorter
            .iter()
            .filter(|(token, _)| longer.contains(*token))
            .map(|(token, frequency)| {
                self.weight(token, frequency) * self.weight(token, longer.get(token))
            })
            .sum()
    }

    /// `cos²` between a document and a category vector, 0 for zero norms.
    fn cos_square(&self, document: &FrequencyTable<T>, document_norm: f64, profile: &CategoryVector<T>) -> f64 {
        if document_norm == 0.0 || profile.norm == 0.0 {
            return 0.0;
        }
        let product = self.dot(document, &profile.frequencies);
        product * product / (document_norm * profile.norm)
    }
}

impl<T: Token> Classifier<FrequencyTable<T>> for TfIdfClassifier<T> {
    fn candidates(&self, document: &FrequencyTable<T>) -> Vec<ClassificationResult> {
        let document_norm = self.squared_norm(document);
        ranked(
            self.profiles
                .iter()
                .map(|profile| {
                    ClassificationResult::new(
                        profile.category.clone(),
                        self.cos_square(document, document_norm, profile),
                    )
                })
                .collect(),
        )
    }

    fn name(&self) -> &str {
        "TF-IDF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Trainable;

    fn doc(tokens: &[&str]) -> FrequencyTable<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn fitted(
        formula: TfIdfFormula,
        samples: &[(&str, &[&str])],
    ) -> Box<dyn Classifier<FrequencyTable<String>>> {
        let factory = TfIdfClassifierFactory::new().with_formula(formula);
        let mut model = factory.build_model();
        for (category, tokens) in samples {
            model.train(&doc(tokens), &Category::new(*category));
        }
        factory.classifier(&mut model).unwrap()
    }

    #[test]
    fn test_simple_corpus() {
        let classifier = fitted(
            TfIdfFormula::Standard,
            &[("CAT1", &["a", "a", "b"]), ("CAT2", &["b", "c", "c"])],
        );
        let best = classifier.classify(&doc(&["a", "a"])).unwrap();
        assert_eq!(best.category, Category::new("CAT1"));
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let classifier = fitted(
            TfIdfFormula::Standard,
            &[("CAT1", &["a", "b"]), ("CAT2", &["c", "d"])],
        );
        let candidates = classifier.candidates(&doc(&["a"]));
        let cat2 = candidates.iter().find(|c| c.category.name() == "CAT2").unwrap();
        assert_eq!(cat2.score, 0.0);
    }

    #[test]
    fn test_norm_includes_unique_tokens() {
        // With frequency weights: doc (a:1), CAT1 (a:1, b:1).
        // cos² = 1² / (1 · 2) = 0.5, the `b` dimension counts in the norm.
        let classifier = fitted(TfIdfFormula::Frequency, &[("CAT1", &["a", "b"])]);
        let candidates = classifier.candidates(&doc(&["a"]));
        assert!((candidates[0].score - 0.5).abs() < 1e-12);

        // Tokens unique to the document also count: doc (a:1, b:1) vs CAT2 (a:1).
        let classifier = fitted(
            TfIdfFormula::Frequency,
            &[("CAT1", &["b"]), ("CAT2", &["a"])],
        );
        let candidates = classifier.candidates(&doc(&["a", "b"]));
        for candidate in candidates {
            assert!((candidate.score - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_identical_vector_scores_one() {
        let classifier = fitted(TfIdfFormula::Threshold, &[("x", &["a", "b"]), ("y", &["c"])]);
        let best = classifier.classify(&doc(&["a", "b"])).unwrap();
        assert_eq!(best.category, Category::new("x"));
        assert!((best.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exclusive_token_favors_category() {
        let classifier = fitted(
            TfIdfFormula::Standard,
            &[
                ("sports", &["ball", "team", "win"]),
                ("sports", &["goal", "team"]),
                ("politics", &["vote", "team", "win"]),
            ],
        );
        let candidates = classifier.candidates(&doc(&["goal", "win"]));
        assert_eq!(candidates[0].category, Category::new("sports"));
        assert!(candidates[0].score > candidates[1].score);
    }

    #[test]
    fn test_unknown_document_scores_zero() {
        let classifier = fitted(TfIdfFormula::Standard, &[("x", &["a"]), ("y", &["b"])]);
        let candidates = classifier.candidates(&doc(&["zzz"]));
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.score == 0.0));
    }

    #[test]
    fn test_empty_model() {
        let classifier = fitted(TfIdfFormula::Standard, &[]);
        assert!(classifier.candidates(&doc(&["a"])).is_empty());
    }
}
