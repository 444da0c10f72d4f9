//! Confusion matrix and the statistics derived from it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::Result;

/// Counts of `(actual, predicted)` category pairs over a test set.
///
/// A prediction of `None` means the classifier produced no candidate; such
/// samples count as misses for every statistic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: BTreeMap<(Category, Option<Category>), u64>,
    test_time: Duration,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified sample.
    pub fn record(&mut self, actual: &Category, predicted: Option<&Category>) {
        self.record_n(actual, predicted, 1);
    }

    /// Record `times` samples with the same outcome.
    pub fn record_n(&mut self, actual: &Category, predicted: Option<&Category>, times: u64) {
        if times > 0 {
            *self
                .counts
                .entry((actual.clone(), predicted.cloned()))
                .or_insert(0) += times;
        }
    }

    /// Number of samples of `actual` classified as `predicted`.
    pub fn count(&self, actual: &Category, predicted: Option<&Category>) -> u64 {
        self.counts
            .get(&(actual.clone(), predicted.cloned()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of recorded samples.
    pub fn sample_count(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fraction of samples classified correctly.
    pub fn accuracy(&self) -> f64 {
        let correct = self
            .counts
            .iter()
            .filter(|((actual, predicted), _)| predicted.as_ref() == Some(actual))
            .map(|(_, count)| count)
            .sum();
        ratio(correct, self.sample_count())
    }

    /// Fraction of the samples predicted as `category` that belong to it.
    pub fn precision(&self, category: &Category) -> f64 {
        let predicted = self
            .counts
            .iter()
            .filter(|((_, predicted), _)| predicted.as_ref() == Some(category))
            .map(|(_, count)| count)
            .sum();
        ratio(self.hits(category), predicted)
    }

    /// Fraction of the samples of `category` predicted as such.
    pub fn recall(&self, category: &Category) -> f64 {
        let actual = self
            .counts
            .iter()
            .filter(|((actual, _), _)| actual == category)
            .map(|(_, count)| count)
            .sum();
        ratio(self.hits(category), actual)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self, category: &Category) -> f64 {
        let precision = self.precision(category);
        let recall = self.recall(category);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    /// Every category appearing as actual or predicted.
    pub fn categories(&self) -> BTreeSet<Category> {
        let mut categories = BTreeSet::new();
        for (actual, predicted) in self.counts.keys() {
            categories.insert(actual.clone());
            if let Some(predicted) = predicted {
                categories.insert(predicted.clone());
            }
        }
        categories
    }

    /// Number of samples left without a prediction.
    pub fn unclassified(&self) -> u64 {
        self.counts
            .iter()
            .filter(|((_, predicted), _)| predicted.is_none())
            .map(|(_, count)| count)
            .sum()
    }

    /// Wall time spent classifying the test samples.
    pub fn test_time(&self) -> Duration {
        self.test_time
    }

    pub(crate) fn set_test_time(&mut self, test_time: Duration) {
        self.test_time = test_time;
    }

    /// Summary statistics, suitable for serialization.
    pub fn report(&self) -> EvaluationReport {
        EvaluationReport {
            samples: self.sample_count(),
            accuracy: self.accuracy(),
            unclassified: self.unclassified(),
            test_time_ms: self.test_time.as_millis() as u64,
            categories: self
                .categories()
                .into_iter()
                .map(|category| CategoryReport {
                    precision: self.precision(&category),
                    recall: self.recall(&category),
                    f1: self.f1(&category),
                    support: self.support(&category),
                    category,
                })
                .collect(),
        }
    }

    fn hits(&self, category: &Category) -> u64 {
        self.count(category, Some(category))
    }

    fn support(&self, category: &Category) -> u64 {
        self.counts
            .iter()
            .filter(|((actual, _), _)| actual == category)
            .map(|(_, count)| count)
            .sum()
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    /// Rows are actual categories, columns predicted ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let categories = self.categories();
        let unclassified = self.unclassified() > 0;

        for category in &categories {
            write!(f, "\t{category}")?;
        }
        if unclassified {
            write!(f, "\t(none)")?;
        }
        writeln!(f)?;
        for actual in &categories {
            write!(f, "{actual}")?;
            for predicted in &categories {
                write!(f, "\t{}", self.count(actual, Some(predicted)))?;
            }
            if unclassified {
                write!(f, "\t{}", self.count(actual, None))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Samples: {}", self.sample_count())?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy())?;
        write!(f, "Time: {:?}", self.test_time)
    }
}

/// Per-category statistics of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: Category,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of test samples of the category.
    pub support: u64,
}

/// Serializable summary of a [`ConfusionMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: u64,
    pub accuracy: f64,
    pub unclassified: u64,
    pub test_time_ms: u64,
    pub categories: Vec<CategoryReport>,
}

impl EvaluationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
