//! Policies for dividing a data set into training and test parts.
//!
//! Random policies draw from a caller supplied [`Rng`], so a seeded
//! generator makes every split reproducible.

use bit_vec::BitVec;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxisError};
use crate::validation::dataset::{DataSet, SplitDataSet};

/// How a data set is divided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Each sample goes to training with probability `train_ratio`.
    #[default]
    Random,
    /// Exactly `floor(n · train_ratio)` randomly chosen samples go to training.
    Shuffle,
    /// The first `floor(n · train_ratio)` samples go to training.
    Sequential,
    /// Training and test parts are both the whole data set.
    NoSplit,
}

/// Divide `dataset` according to `policy`.
pub fn split<D, R: Rng>(
    dataset: &DataSet<D>,
    policy: SplitPolicy,
    train_ratio: f64,
    rng: &mut R,
) -> Result<SplitDataSet<D>> {
    match policy {
        SplitPolicy::Random => random_split(dataset, train_ratio, rng),
        SplitPolicy::Shuffle => shuffle_split(dataset, train_ratio, rng),
        SplitPolicy::Sequential => sequential_split(dataset, train_ratio),
        SplitPolicy::NoSplit => Ok(no_split(dataset)),
    }
}

/// Independent Bernoulli draw per sample; the split size is only expected
/// to match the ratio.
pub fn random_split<D, R: Rng>(
    dataset: &DataSet<D>,
    train_ratio: f64,
    rng: &mut R,
) -> Result<SplitDataSet<D>> {
    check_ratio(train_ratio)?;
    let train = BitVec::from_fn(dataset.len(), |_| rng.random::<f64>() < train_ratio);
    Ok(complementary(dataset, format!("random{train_ratio}"), train))
}

/// Exact random split: shuffle the sample positions and send the first
/// `floor(n · train_ratio)` of them to training.
pub fn shuffle_split<D, R: Rng>(
    dataset: &DataSet<D>,
    train_ratio: f64,
    rng: &mut R,
) -> Result<SplitDataSet<D>> {
    check_ratio(train_ratio)?;
    let mut positions: Vec<usize> = (0..dataset.len()).collect();
    positions.shuffle(rng);

    let mut train = BitVec::from_elem(dataset.len(), false);
    for &position in &positions[..cut(dataset.len(), train_ratio)] {
        train.set(position, true);
    }
    Ok(complementary(dataset, format!("shuffle{train_ratio}"), train))
}

/// The first `floor(n · train_ratio)` samples train, the rest test.
pub fn sequential_split<D>(dataset: &DataSet<D>, train_ratio: f64) -> Result<SplitDataSet<D>> {
    check_ratio(train_ratio)?;
    let cut = cut(dataset.len(), train_ratio);
    let train = BitVec::from_fn(dataset.len(), |i| i < cut);
    Ok(complementary(dataset, format!("first{train_ratio}"), train))
}

/// Train and test on the whole data set.
pub fn no_split<D>(dataset: &DataSet<D>) -> SplitDataSet<D> {
    let all = BitVec::from_elem(dataset.len(), true);
    dataset.split(dataset.name().to_string(), all.clone(), all)
}

fn check_ratio(train_ratio: f64) -> Result<()> {
    if (0.0..=1.0).contains(&train_ratio) {
        Ok(())
    } else {
        Err(TaxisError::invalid_argument(format!(
            "train ratio must be within [0, 1], got {train_ratio}"
        )))
    }
}

fn cut(len: usize, train_ratio: f64) -> usize {
    ((len as f64 * train_ratio).floor() as usize).min(len)
}

fn complementary<D>(dataset: &DataSet<D>, policy: String, train: BitVec) -> SplitDataSet<D> {
    let mut test = train.clone();
    test.negate();
    let name = format!("{}(train={policy})", dataset.name());
    let split = dataset.split(name, train, test);
    debug!(
        "{}: {} training, {} test samples",
        split.name(),
        split.train_len(),
        split.test_len()
    );
    split
}
