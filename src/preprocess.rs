//! Text preprocessing in front of token based strategies.
//!
//! The classification core only counts tokens. A [`Preprocessor`] turns raw
//! text into tokens, and [`PreprocessClassifierFactory`] plugs one in front of
//! any token strategy so that it can be trained and validated on strings.

use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::category::{Category, ClassificationResult, Token};
use crate::classifier::{Classifier, Strategy};
use crate::error::{Result, TaxisError};
use crate::frequency::FrequencyTable;

/// Converts text into a token sequence.
pub trait Preprocessor<T>: Send + Sync {
    fn tokens(&self, text: &str) -> Vec<T>;

    /// Count the tokens of `text`.
    fn frequencies(&self, text: &str) -> FrequencyTable<T>
    where
        T: Token,
    {
        FrequencyTable::from_tokens(self.tokens(text))
    }
}

impl<T, F> Preprocessor<T> for F
where
    F: Fn(&str) -> Vec<T> + Send + Sync,
{
    fn tokens(&self, text: &str) -> Vec<T> {
        self(text)
    }
}

/// Splits text into Unicode words (UAX #29), lowercased by default.
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    preserve_case: bool,
    stop_words: AHashSet<String>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the original case of words.
    pub fn preserve_case(mut self) -> Self {
        self.preserve_case = true;
        self
    }

    /// Drop the given words. Matching happens after case folding.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(words.into_iter().map(Into::into));
        self
    }
}

impl Preprocessor<String> for WordTokenizer {
    fn tokens(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| {
                if self.preserve_case {
                    word.to_string()
                } else {
                    word.to_lowercase()
                }
            })
            .filter(|word| !self.stop_words.contains(word))
            .collect()
    }
}

/// Overlapping character n-grams over grapheme clusters.
///
/// Useful for languages written without spaces between words.
#[derive(Debug, Clone, Copy)]
pub struct NGramTokenizer {
    n: usize,
}

impl NGramTokenizer {
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(TaxisError::invalid_argument("n-gram length must be at least 1"));
        }
        Ok(NGramTokenizer { n })
    }
}

impl Preprocessor<String> for NGramTokenizer {
    fn tokens(&self, text: &str) -> Vec<String> {
        let graphemes: Vec<&str> = text
            .graphemes(true)
            .filter(|g| !g.chars().all(char::is_whitespace))
            .collect();
        graphemes.windows(self.n).map(|window| window.concat()).collect()
    }
}

/// Trains a token strategy on text through a preprocessor.
pub struct PreprocessClassifierFactory<T> {
    preprocessor: Arc<dyn Preprocessor<T>>,
    strategy: Box<dyn Strategy<FrequencyTable<T>>>,
}

impl<T: Token> PreprocessClassifierFactory<T> {
    pub fn new<P, S>(preprocessor: P, strategy: S) -> Self
    where
        P: Preprocessor<T> + 'static,
        S: Strategy<FrequencyTable<T>> + 'static,
    {
        Self::from_boxed(preprocessor, Box::new(strategy))
    }

    /// Wrap an already boxed strategy, such as one built from configuration.
    pub fn from_boxed<P>(preprocessor: P, strategy: Box<dyn Strategy<FrequencyTable<T>>>) -> Self
    where
        P: Preprocessor<T> + 'static,
    {
        PreprocessClassifierFactory {
            preprocessor: Arc::new(preprocessor),
            strategy,
        }
    }
}

impl<T: Token> PreprocessClassifierFactory<T> {
    /// Preprocess `samples`, train the wrapped strategy and return a
    /// classifier over text.
    pub fn fit_text<'a, I>(&self, samples: I) -> Result<PreprocessClassifier<T>>
    where
        I: IntoIterator<Item = (&'a str, &'a Category)>,
    {
        let documents: Vec<(FrequencyTable<T>, &Category)> = samples
            .into_iter()
            .map(|(text, category)| (self.preprocessor.frequencies(text), category))
            .collect();
        let mut documents = documents.iter().map(|(document, category)| (document, *category));
        let inner = self.strategy.train_classifier(&mut documents)?;
        Ok(PreprocessClassifier {
            preprocessor: Arc::clone(&self.preprocessor),
            inner,
        })
    }
}

impl<T> fmt::Debug for PreprocessClassifierFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreprocessClassifierFactory")
            .field("strategy", &self.strategy.label())
            .finish_non_exhaustive()
    }
}

impl<T: Token> Strategy<String> for PreprocessClassifierFactory<T> {
    fn label(&self) -> String {
        self.strategy.label()
    }

    fn train_classifier<'a>(
        &self,
        samples: &mut dyn Iterator<Item = (&'a String, &'a Category)>,
    ) -> Result<Box<dyn Classifier<String>>>
    where
        String: 'a,
    {
        let classifier = self.fit_text(samples.map(|(text, category)| (text.as_str(), category)))?;
        Ok(Box::new(classifier))
    }
}

/// A fitted token classifier that accepts text.
pub struct PreprocessClassifier<T> {
    preprocessor: Arc<dyn Preprocessor<T>>,
    inner: Box<dyn Classifier<FrequencyTable<T>>>,
}

impl<T: Token> Classifier<str> for PreprocessClassifier<T> {
    fn candidates(&self, text: &str) -> Vec<ClassificationResult> {
        self.inner.candidates(&self.preprocessor.frequencies(text))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<T: Token> Classifier<String> for PreprocessClassifier<T> {
    fn candidates(&self, text: &String) -> Vec<ClassificationResult> {
        Classifier::<str>::candidates(self, text.as_str())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
