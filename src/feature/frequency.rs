//! Keep tokens whose corpus frequency falls in a range.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::category::Token;
use crate::error::{Result, TaxisError};
use crate::feature::FeatureSelector;
use crate::model::TokenFrequenciesModel;

/// Which corpus frequency a range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyKind {
    /// Total number of occurrences.
    #[default]
    Token,
    /// Number of documents containing the token.
    Document,
}

/// Keeps tokens with `start <= frequency < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyFeatureSelector {
    start: u64,
    end: u64,
    kind: FrequencyKind,
}

impl FrequencyFeatureSelector {
    /// Create a selector for the half-open range `[start, end)`.
    pub fn new(start: u64, end: u64, kind: FrequencyKind) -> Result<Self> {
        if start >= end {
            return Err(TaxisError::invalid_argument(format!(
                "empty frequency range [{start}, {end})"
            )));
        }
        Ok(FrequencyFeatureSelector { start, end, kind })
    }

    /// Keep tokens occurring at least `start` times.
    pub fn at_least(start: u64, kind: FrequencyKind) -> Self {
        FrequencyFeatureSelector {
            start,
            end: u64::MAX,
            kind,
        }
    }
}

impl<T: Token> FeatureSelector<T> for FrequencyFeatureSelector {
    fn select(&self, model: &dyn TokenFrequenciesModel<T>) -> AHashSet<T> {
        let frequencies = match self.kind {
            FrequencyKind::Token => model.total_token_frequencies(),
            FrequencyKind::Document => model.total_document_frequencies(),
        };
        frequencies
            .iter()
            .filter(|(_, frequency)| (self.start..self.end).contains(frequency))
            .map(|(token, _)| token.clone())
            .collect()
    }

    fn describe(&self) -> String {
        let kind = match self.kind {
            FrequencyKind::Token => "token",
            FrequencyKind::Document => "document",
        };
        format!("[{kind}-frequency:{},{}]", self.start, self.end)
    }
}
