//! Evaluation harness: data sets, split policies, the validator and the
//! confusion matrix it fills.
//!
//! ```
//! use taxis::classifier::BayesianClassifierFactory;
//! use taxis::frequency::FrequencyTable;
//! use taxis::validation::{DataSet, Validator, divider};
//!
//! let docs = [("a a b", "cat1"), ("b c c", "cat2"), ("a b a", "cat1"), ("c c", "cat2")];
//! let dataset = DataSet::from_pairs(
//!     "toy",
//!     docs.iter().map(|(text, category)| {
//!         (FrequencyTable::from_tokens(text.split(' ').map(String::from)), *category)
//!     }),
//! );
//!
//! let split = divider::no_split(&dataset);
//! let mut validator = Validator::new();
//! let matrix = validator
//!     .validate(&split, &BayesianClassifierFactory::<String>::new())
//!     .unwrap();
//! assert_eq!(matrix.accuracy(), 1.0);
//! ```

pub mod confusion;
pub mod dataset;
pub mod divider;
pub mod validator;

pub use confusion::{CategoryReport, ConfusionMatrix, EvaluationReport};
pub use dataset::{CsvFormat, DataSet, Sample, SplitDataSet};
pub use divider::SplitPolicy;
pub use validator::Validator;
