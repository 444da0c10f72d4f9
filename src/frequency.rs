//! Sparse token frequency tables.
//!
//! [`FrequencyTable`] is the counting primitive behind every profile: a
//! document is a table of its tokens, an aggregated category profile is the
//! merge of its documents. Tables are mutable while a model is trained and
//! are frozen into a [`FrozenTable`] when a classifier takes its snapshot.

use std::borrow::Borrow;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::category::Token;

/// A sparse token → count table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Eq + Hash",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct FrequencyTable<T> {
    counts: AHashMap<T, u64>,
}

impl<T: Token> PartialEq for FrequencyTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.counts.len() == other.counts.len()
            && self
                .counts
                .iter()
                .all(|(token, count)| other.counts.get(token) == Some(count))
    }
}

impl<T: Token> Eq for FrequencyTable<T> {}

impl<T: Token> Default for FrequencyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> FrequencyTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        FrequencyTable {
            counts: AHashMap::new(),
        }
    }

    /// Create an empty table with room for `capacity` distinct tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        FrequencyTable {
            counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Count every token yielded by `tokens`.
    pub fn from_tokens<I: IntoIterator<Item = T>>(tokens: I) -> Self {
        let tokens = tokens.into_iter();
        let mut table = Self::with_capacity(tokens.size_hint().0);
        for token in tokens {
            table.advance(token);
        }
        table
    }

    /// Increase the count of `token` by one.
    pub fn advance(&mut self, token: T) {
        self.advance_by(token, 1);
    }

    /// Increase the count of `token` by `amount`.
    pub fn advance_by(&mut self, token: T, amount: u64) {
        if amount == 0 {
            return;
        }
        *self.counts.entry(token).or_insert(0) += amount;
    }

    /// The count of `token`, 0 if absent.
    pub fn get<Q>(&self, token: &Q) -> u64
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Whether `token` has a non-zero count.
    pub fn contains<Q>(&self, token: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Add all counts of `other` into this table.
    pub fn merge(&mut self, other: &FrequencyTable<T>) {
        self.counts.reserve(other.len());
        for (token, &count) in other.counts.iter() {
            self.advance_by(token.clone(), count);
        }
    }

    /// Drop every token that is not in `keep`.
    pub fn retain_all(&mut self, keep: &AHashSet<T>) {
        self.counts.retain(|token, _| keep.contains(token));
    }

    /// Reset the count of `token` to zero, returning the old count.
    pub fn remove<Q>(&mut self, token: &Q) -> u64
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.remove(token).unwrap_or(0)
    }

    /// Iterate over `(token, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u64)> {
        self.counts.iter().map(|(token, &count)| (token, count))
    }

    /// Iterate over the distinct tokens in unspecified order.
    pub fn tokens(&self) -> impl Iterator<Item = &T> {
        self.counts.keys()
    }

    /// All `(token, count)` pairs ordered by token.
    pub fn sorted_entries(&self) -> Vec<(&T, u64)> {
        let mut entries: Vec<(&T, u64)> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Order two tables so that the first one has fewer distinct tokens.
    ///
    /// Pairwise operations iterate the first table and look tokens up in the
    /// second.
    pub fn sparser_first<'a>(a: &'a Self, b: &'a Self) -> (&'a Self, &'a Self) {
        if a.len() <= b.len() { (a, b) } else { (b, a) }
    }

    /// Histogram of counts: how many distinct tokens occur exactly `n` times.
    pub fn histogram(&self) -> FrequencyTable<u64> {
        let mut histogram = FrequencyTable::new();
        for &count in self.counts.values() {
            histogram.advance(count);
        }
        histogram
    }

    /// Freeze the table into an immutable, cheaply clonable snapshot.
    pub fn freeze(self) -> FrozenTable<T> {
        FrozenTable {
            inner: Arc::new(self),
        }
    }
}

impl FrequencyTable<u64> {
    /// Quantiles of a count histogram.
    ///
    /// For every level `q`, walks the histogram in ascending count order and
    /// returns the first count at which at least `q` of all tokens have been
    /// covered.
    pub fn quantiles(&self, levels: &[f64]) -> Vec<u64> {
        let total = self.total() as f64;
        let mut covered = vec![0u64; levels.len()];
        let mut quantiles = vec![0u64; levels.len()];

        for (&count, tokens) in self.sorted_entries() {
            for (i, &level) in levels.iter().enumerate() {
                if (covered[i] as f64) < total * level {
                    covered[i] += tokens;
                    quantiles[i] = count;
                }
            }
        }
        quantiles
    }
}

impl<T: Token> FromIterator<T> for FrequencyTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

impl<T: Token> Extend<T> for FrequencyTable<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for token in iter {
            self.advance(token);
        }
    }
}

/// An immutable snapshot of a [`FrequencyTable`].
///
/// Fitted classifiers hold frozen tables, so later training on the source
/// model is never observed by them.
#[derive(Debug, Clone)]
pub struct FrozenTable<T> {
    inner: Arc<FrequencyTable<T>>,
}

impl<T: Token> PartialEq for FrozenTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Token> Default for FrozenTable<T> {
    fn default() -> Self {
        FrequencyTable::new().freeze()
    }
}

impl<T> Deref for FrozenTable<T> {
    type Target = FrequencyTable<T>;

    fn deref(&self) -> &FrequencyTable<T> {
        &self.inner
    }
}

impl<T: Token> From<FrequencyTable<T>> for FrozenTable<T> {
    fn from(table: FrequencyTable<T>) -> Self {
        table.freeze()
    }
}
