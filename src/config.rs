//! Serializable configuration for strategies and validation runs.
//!
//! The linear SVM strategy needs a caller supplied solver and is therefore
//! not configurable here.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::category::Token;
use crate::classifier::{
    BayesianClassifierFactory, C45ClassifierFactory, KNearestClassifierFactory, Strategy,
    TfIdfClassifierFactory, TfIdfFormula,
};
use crate::error::{Result, TaxisError};
use crate::feature::{FeatureSelector, FrequencyFeatureSelector, FrequencyKind, TfIdfFeatureSelector};
use crate::frequency::FrequencyTable;
use crate::validation::{DataSet, SplitDataSet, SplitPolicy, divider};

/// Classification algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Bayesian,
    #[serde(rename = "tfidf")]
    TfIdf,
    #[serde(rename = "knn")]
    KNearest,
    #[serde(rename = "c45")]
    C45,
}

/// Feature selection applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureSelectionConfig {
    /// Keep tokens with `start <= frequency < end`; no `end` means unbounded.
    Frequency {
        start: u64,
        #[serde(default)]
        end: Option<u64>,
        #[serde(default)]
        kind: FrequencyKind,
    },
    /// Keep the `count` tokens of highest corpus TF-IDF weight.
    #[serde(rename = "tfidf")]
    TfIdf { count: usize },
}

impl FeatureSelectionConfig {
    fn build<T: Token>(&self, formula: TfIdfFormula) -> Result<Arc<dyn FeatureSelector<T>>> {
        let selector: Arc<dyn FeatureSelector<T>> = match *self {
            FeatureSelectionConfig::Frequency { start, end: Some(end), kind } => {
                Arc::new(FrequencyFeatureSelector::new(start, end, kind)?)
            }
            FeatureSelectionConfig::Frequency { start, end: None, kind } => {
                Arc::new(FrequencyFeatureSelector::at_least(start, kind))
            }
            FeatureSelectionConfig::TfIdf { count } => {
                Arc::new(TfIdfFeatureSelector::new(count).with_formula(formula))
            }
        };
        Ok(selector)
    }
}

/// Configuration of one classification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Weighting used by the TF-IDF, kNN and TF-IDF selection code paths.
    #[serde(default)]
    pub formula: TfIdfFormula,

    /// Number of neighbours for kNN.
    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default)]
    pub feature_selection: Option<FeatureSelectionConfig>,
}

fn default_k() -> usize {
    1
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            algorithm: Algorithm::default(),
            formula: TfIdfFormula::default(),
            k: default_k(),
            feature_selection: None,
        }
    }
}

impl ClassifierConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        from_file(path)
    }

    /// Build the configured strategy.
    pub fn build<T: Token>(&self) -> Result<Box<dyn Strategy<FrequencyTable<T>>>> {
        let selector = self
            .feature_selection
            .map(|selection| selection.build::<T>(self.formula))
            .transpose()?;

        let strategy: Box<dyn Strategy<FrequencyTable<T>>> = match self.algorithm {
            Algorithm::Bayesian => {
                let factory = BayesianClassifierFactory::<T>::new();
                match selector {
                    Some(selector) => Box::new(factory.with_feature_selector(selector)),
                    None => Box::new(factory),
                }
            }
            Algorithm::TfIdf => {
                let factory = TfIdfClassifierFactory::<T>::new().with_formula(self.formula);
                match selector {
                    Some(selector) => Box::new(factory.with_feature_selector(selector)),
                    None => Box::new(factory),
                }
            }
            Algorithm::KNearest => {
                if self.k == 0 {
                    return Err(TaxisError::invalid_config("k must be at least 1"));
                }
                let factory = KNearestClassifierFactory::<T>::new()
                    .with_k(self.k)
                    .with_formula(self.formula);
                match selector {
                    Some(selector) => Box::new(factory.with_feature_selector(selector)),
                    None => Box::new(factory),
                }
            }
            Algorithm::C45 => {
                let factory = C45ClassifierFactory::<T>::new();
                match selector {
                    Some(selector) => Box::new(factory.with_feature_selector(selector)),
                    None => Box::new(factory),
                }
            }
        };
        Ok(strategy)
    }
}

/// How a validation run divides its data sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub split: SplitPolicy,

    /// Share of samples used for training (0.0-1.0).
    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,

    /// Seed of the random source used by random policies.
    #[serde(default)]
    pub seed: u64,
}

fn default_train_ratio() -> f64 {
    0.7
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            split: SplitPolicy::default(),
            train_ratio: default_train_ratio(),
            seed: 0,
        }
    }
}

impl ValidationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        from_file(path)
    }

    /// Divide `dataset` with the configured policy and a generator seeded
    /// with `seed`.
    pub fn split<D>(&self, dataset: &DataSet<D>) -> Result<SplitDataSet<D>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        divider::split(dataset, self.split, self.train_ratio, &mut rng)
    }
}

fn from_json<C: DeserializeOwned>(json: &str) -> Result<C> {
    Ok(serde_json::from_str(json)?)
}

fn from_file<C: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<C> {
    from_json(&fs::read_to_string(path)?)
}
