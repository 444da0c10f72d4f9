//! TF-IDF weighting formulas.

use serde::{Deserialize, Serialize};

/// Converts a raw token frequency into a weight, given the number of
/// training documents containing the token and the number of training
/// documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfIdfFormula {
    /// `(1 + ln f) · ln(1 + N / df)`, 0 when `f` is 0.
    #[default]
    Standard,
    /// The raw frequency.
    Frequency,
    /// 1 when the token occurs, 0 otherwise.
    Threshold,
    /// A caller supplied formula `(f, df, N) -> weight`.
    #[serde(skip)]
    Custom(fn(u64, u64, u64) -> f64),
}

impl TfIdfFormula {
    /// Weight of a token occurring `frequency` times, found in
    /// `document_frequency` of `document_count` training documents.
    pub fn weight(&self, frequency: u64, document_frequency: u64, document_count: u64) -> f64 {
        match self {
            TfIdfFormula::Standard => {
                // A token unknown to the corpus carries no weight.
                if frequency == 0 || document_frequency == 0 || document_count == 0 {
                    0.0
                } else {
                    (1.0 + (frequency as f64).ln())
                        * (1.0 + document_count as f64 / document_frequency as f64).ln()
                }
            }
            TfIdfFormula::Frequency => frequency as f64,
            TfIdfFormula::Threshold => {
                if frequency > 0 {
                    1.0
                } else {
                    0.0
                }
            }
            TfIdfFormula::Custom(formula) => formula(frequency, document_frequency, document_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard() {
        let formula = TfIdfFormula::Standard;
        assert_eq!(formula.weight(0, 3, 10), 0.0);

        let weight = formula.weight(1, 2, 10);
        assert!((weight - 6.0f64.ln()).abs() < 1e-12);

        let weight = formula.weight(3, 2, 10);
        assert!((weight - (1.0 + 3.0f64.ln()) * 6.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_standard_unknown_token() {
        assert_eq!(TfIdfFormula::Standard.weight(2, 0, 10), 0.0);
        assert_eq!(TfIdfFormula::Standard.weight(2, 1, 0), 0.0);
    }

    #[test]
    fn test_frequency_and_threshold() {
        assert_eq!(TfIdfFormula::Frequency.weight(7, 1, 1), 7.0);
        assert_eq!(TfIdfFormula::Threshold.weight(7, 1, 1), 1.0);
        assert_eq!(TfIdfFormula::Threshold.weight(0, 1, 1), 0.0);
    }

    #[test]
    fn test_custom() {
        fn double(f: u64, _: u64, _: u64) -> f64 {
            2.0 * f as f64
        }
        assert_eq!(TfIdfFormula::Custom(double).weight(3, 1, 1), 6.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TfIdfFormula::Threshold).unwrap();
        assert_eq!(json, "\"threshold\"");
    }
}
