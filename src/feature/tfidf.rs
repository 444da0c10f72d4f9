//! Keep the tokens with the highest corpus-wide TF-IDF weight.

use ahash::AHashSet;

use crate::category::Token;
use crate::classifier::TfIdfFormula;
use crate::feature::FeatureSelector;
use crate::model::TokenFrequenciesModel;
use crate::util::bounded::BoundedSortedList;

/// Keeps the `count` tokens scoring highest under a TF-IDF formula applied
/// to their corpus-wide token and document frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfIdfFeatureSelector {
    count: usize,
    formula: TfIdfFormula,
}

impl TfIdfFeatureSelector {
    /// Keep the `count` best tokens under the standard formula.
    pub fn new(count: usize) -> Self {
        TfIdfFeatureSelector {
            count,
            formula: TfIdfFormula::Standard,
        }
    }

    /// Score tokens with another formula.
    pub fn with_formula(mut self, formula: TfIdfFormula) -> Self {
        self.formula = formula;
        self
    }
}

impl<T: Token> FeatureSelector<T> for TfIdfFeatureSelector {
    fn select(&self, model: &dyn TokenFrequenciesModel<T>) -> AHashSet<T> {
        let token_frequencies = model.total_token_frequencies();
        let document_frequencies = model.total_document_frequencies();
        let sample_count = model.sample_count();

        // Highest weight first; equal weights keep token order.
        let mut best = BoundedSortedList::new(self.count, |a: &(&T, f64), b: &(&T, f64)| {
            b.1.total_cmp(&a.1)
        });
        for (token, document_frequency) in document_frequencies.sorted_entries() {
            let weight = self.formula.weight(
                token_frequencies.get(token),
                document_frequency,
                sample_count,
            );
            best.push((token, weight));
        }
        best.into_vec()
            .into_iter()
            .map(|(token, _)| token.clone())
            .collect()
    }

    fn describe(&self) -> String {
        format!("[tfidf:{}]", self.count)
    }
}
