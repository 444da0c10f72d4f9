//! # Taxis
//!
//! A multi-strategy document classification toolkit.
//!
//! ## Features
//!
//! - Sparse token frequency tables and per-category training models
//! - Naive Bayes, TF-IDF cosine, k-nearest neighbours and C4.5 decision tree
//!   classifiers, plus a linear SVM over a pluggable solver
//! - Frequency and TF-IDF based feature selection
//! - Text preprocessing in front of any token strategy
//! - Train/test splitting, confusion matrices and strategy comparison
//! - Text and bincode persistence of trained models
//!
//! ## Example
//!
//! ```
//! use taxis::prelude::*;
//!
//! let strategy = PreprocessClassifierFactory::new(WordTokenizer::new(), TfIdfClassifierFactory::new());
//! let samples = [
//!     ("the striker scored a goal", Category::new("sports")),
//!     ("parliament passed the law", Category::new("politics")),
//! ];
//! let classifier = strategy
//!     .fit_text(samples.iter().map(|(text, category)| (*text, category)))
//!     .unwrap();
//!
//! let best = Classifier::<str>::classify(&classifier, "a late goal").unwrap();
//! assert_eq!(best.category, Category::new("sports"));
//! ```

pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
pub mod feature;
pub mod frequency;
pub mod model;
pub mod persist;
pub mod preprocess;
pub mod util;
pub mod validation;

pub mod prelude {
    pub use crate::category::{Category, ClassificationResult, Token};
    pub use crate::classifier::{
        BayesianClassifierFactory, C45ClassifierFactory, Classifier, ClassifierFactory,
        KNearestClassifierFactory, Strategy, SvmClassifierFactory, TfIdfClassifierFactory,
        TfIdfFormula,
    };
    pub use crate::config::{ClassifierConfig, ValidationConfig};
    pub use crate::error::{Result, TaxisError};
    pub use crate::feature::{FeatureSelector, FrequencyFeatureSelector, FrequencyKind, TfIdfFeatureSelector};
    pub use crate::frequency::FrequencyTable;
    pub use crate::model::{DocumentVectorsModel, FrequenciesModel, TokenFrequenciesModel, Trainable};
    pub use crate::preprocess::{NGramTokenizer, PreprocessClassifierFactory, Preprocessor, WordTokenizer};
    pub use crate::validation::{ConfusionMatrix, CsvFormat, DataSet, SplitDataSet, SplitPolicy, Validator};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
