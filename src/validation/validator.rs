//! Train-and-test driver comparing strategies over data sets.

use std::collections::BTreeMap;
use std::time::Instant;

use log::info;

use crate::classifier::{Classifier, Strategy};
use crate::error::Result;
use crate::validation::confusion::ConfusionMatrix;
use crate::validation::dataset::{Sample, SplitDataSet};

/// Runs strategies over split data sets and keeps the resulting confusion
/// matrices, keyed by `(data set name, strategy label)`.
#[derive(Debug, Default)]
pub struct Validator {
    matrices: BTreeMap<(String, String), ConfusionMatrix>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Train a fresh classifier with `strategy` on the training part of
    /// `dataset` and evaluate it on the test part.
    pub fn validate<D>(&mut self, dataset: &SplitDataSet<D>, strategy: &dyn Strategy<D>) -> Result<&ConfusionMatrix> {
        let label = strategy.label();
        let mut samples = dataset.train_samples().map(|sample| (&sample.data, &sample.category));
        let classifier = strategy.train_classifier(&mut samples)?;
        let matrix = Self::test(dataset.test_samples(), classifier.as_ref());

        info!(
            "{} on {}: accuracy {:.4} over {} samples in {:?}",
            label,
            dataset.name(),
            matrix.accuracy(),
            matrix.sample_count(),
            matrix.test_time()
        );
        let key = (dataset.name().to_string(), label);
        self.matrices.insert(key.clone(), matrix);
        Ok(&self.matrices[&key])
    }

    /// Validate every strategy on every data set.
    pub fn validate_all<D>(&mut self, datasets: &[SplitDataSet<D>], strategies: &[&dyn Strategy<D>]) -> Result<()> {
        for dataset in datasets {
            for strategy in strategies {
                self.validate(dataset, *strategy)?;
            }
        }
        Ok(())
    }

    /// Classify `samples` with a fitted classifier.
    pub fn test<'a, D, C>(samples: impl Iterator<Item = &'a Sample<D>>, classifier: &C) -> ConfusionMatrix
    where
        D: 'a,
        C: Classifier<D> + ?Sized,
    {
        let mut matrix = ConfusionMatrix::new();
        let start = Instant::now();
        for sample in samples {
            let predicted = classifier.classify(&sample.data);
            matrix.record(&sample.category, predicted.as_ref().map(|result| &result.category));
        }
        matrix.set_test_time(start.elapsed());
        matrix
    }

    /// The matrix of one `(data set, strategy)` pair.
    pub fn matrix(&self, dataset: &str, strategy: &str) -> Option<&ConfusionMatrix> {
        self.matrices.get(&(dataset.to_string(), strategy.to_string()))
    }

    pub fn matrices(&self) -> &BTreeMap<(String, String), ConfusionMatrix> {
        &self.matrices
    }

    /// The strategy whose worst accuracy over all data sets is highest,
    /// together with that accuracy. Ties go to the smallest label.
    pub fn select_most_accurate(&self) -> Option<(&str, f64)> {
        let mut worst: BTreeMap<&str, f64> = BTreeMap::new();
        for ((_, strategy), matrix) in &self.matrices {
            let accuracy = matrix.accuracy();
            worst
                .entry(strategy.as_str())
                .and_modify(|min| *min = min.min(accuracy))
                .or_insert(accuracy);
        }

        let mut best: Option<(&str, f64)> = None;
        for (strategy, accuracy) in worst {
            if best.is_none_or(|(_, max)| accuracy > max) {
                best = Some((strategy, accuracy));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, ClassificationResult};
    use crate::classifier::{BayesianClassifierFactory, TfIdfClassifierFactory};
    use crate::frequency::FrequencyTable;
    use crate::validation::dataset::DataSet;
    use crate::validation::divider::{no_split, sequential_split};

    fn corpus() -> DataSet<FrequencyTable<String>> {
        let docs: [(&[&str], &str); 6] = [
            (&["ball", "team", "goal"], "sports"),
            (&["vote", "law", "party"], "politics"),
            (&["ball", "team", "win"], "sports"),
            (&["vote", "law", "court"], "politics"),
            (&["ball", "team"], "sports"),
            (&["vote", "law"], "politics"),
        ];
        DataSet::from_pairs(
            "news",
            docs.iter().map(|(tokens, category)| {
                (tokens.iter().map(|t| t.to_string()).collect(), *category)
            }),
        )
    }

    struct Constant(Option<&'static str>);

    impl Classifier<FrequencyTable<String>> for Constant {
        fn candidates(&self, _data: &FrequencyTable<String>) -> Vec<ClassificationResult> {
            self.0
                .map(|name| vec![ClassificationResult::new(Category::new(name), 1.0)])
                .unwrap_or_default()
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn test_validate_records_matrix() {
        let mut validator = Validator::new();
        let split = no_split(&corpus());
        let matrix = validator
            .validate(&split, &BayesianClassifierFactory::<String>::new())
            .unwrap();
        assert_eq!(matrix.sample_count(), 6);
        assert_eq!(matrix.accuracy(), 1.0);
        assert!(validator.matrix("news", "Bayesian").is_some());
        assert!(validator.matrix("news", "TF-IDF").is_none());
    }

    #[test]
    fn test_test_counts_unclassified() {
        let dataset = corpus();
        let split = no_split(&dataset);
        let matrix = Validator::test(split.test_samples(), &Constant(None));
        assert_eq!(matrix.unclassified(), 6);
        assert_eq!(matrix.accuracy(), 0.0);

        let matrix = Validator::test(split.test_samples(), &Constant(Some("sports")));
        assert_eq!(matrix.accuracy(), 0.5);
    }

    #[test]
    fn test_validate_all_and_select() {
        let dataset = corpus();
        let splits = vec![
            no_split(&dataset),
            sequential_split(&dataset, 0.5).unwrap(),
        ];
        let bayes = BayesianClassifierFactory::<String>::new();
        let tfidf = TfIdfClassifierFactory::<String>::new();
        let mut validator = Validator::new();
        validator.validate_all(&splits, &[&bayes, &tfidf]).unwrap();
        assert_eq!(validator.matrices().len(), 4);
        assert!(validator.matrix("news(train=first0.5)", "TF-IDF").is_some());

        let worst = |label: &str| {
            validator
                .matrices()
                .iter()
                .filter(|((_, strategy), _)| strategy == label)
                .map(|(_, matrix)| matrix.accuracy())
                .fold(f64::INFINITY, f64::min)
        };
        let (label, accuracy) = validator.select_most_accurate().unwrap();
        assert_eq!(accuracy, worst(label));
        assert_eq!(accuracy, worst("Bayesian").max(worst("TF-IDF")));
    }

    #[test]
    fn test_select_uses_worst_case() {
        let mut validator = Validator::new();
        let mut good_then_bad = ConfusionMatrix::new();
        good_then_bad.record(&Category::new("x"), None);
        let mut perfect = ConfusionMatrix::new();
        perfect.record(&Category::new("x"), Some(&Category::new("x")));
        let mut half = ConfusionMatrix::new();
        half.record(&Category::new("x"), Some(&Category::new("x")));
        half.record(&Category::new("x"), None);

        // "steady" averages lower than "spiky" but has the better minimum.
        validator.matrices.insert(("a".into(), "spiky".into()), perfect);
        validator.matrices.insert(("b".into(), "spiky".into()), good_then_bad);
        validator.matrices.insert(("a".into(), "steady".into()), half.clone());
        validator.matrices.insert(("b".into(), "steady".into()), half);

        assert_eq!(validator.select_most_accurate(), Some(("steady", 0.5)));
    }

    #[test]
    fn test_select_on_empty_validator() {
        assert!(Validator::new().select_most_accurate().is_none());
    }
}
