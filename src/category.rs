//! Category labels, token bounds and classification results.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Bound shared by every token type a model can count.
///
/// `Ord` is required so that iteration-sensitive decisions (feature ties,
/// vocabulary indices) are independent of hash order.
pub trait Token: Clone + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

impl<T> Token for T where T: Clone + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

/// A classification label, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(Arc<str>);

impl Category {
    /// Create a category with the given name.
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Category(Arc::from(name.as_ref()))
    }

    /// The name of the category.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Category::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category(Arc::from(name))
    }
}

/// A candidate category together with its score.
///
/// Higher scores mean more confidence. The natural order is descending by
/// score, with equal scores ordered by ascending category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The assigned category.
    pub category: Category,
    /// The score of the category.
    pub score: f64,
}

impl ClassificationResult {
    /// Create a new classification result.
    pub fn new(category: Category, score: f64) -> Self {
        ClassificationResult { category, score }
    }
}

impl Eq for ClassificationResult {}

impl PartialOrd for ClassificationResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassificationResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.category.cmp(&other.category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_identity() {
        let a = Category::new("sports");
        let b: Category = "sports".into();
        let c = Category::from("politics".to_string());

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.name(), "sports");
        assert_eq!(c.to_string(), "politics");
    }

    #[test]
    fn test_result_order() {
        let mut results = vec![
            ClassificationResult::new(Category::new("b"), 0.5),
            ClassificationResult::new(Category::new("c"), 0.9),
            ClassificationResult::new(Category::new("a"), 0.5),
        ];
        results.sort();

        let names: Vec<&str> = results.iter().map(|r| r.category.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_string(&Category::new("spam")).unwrap();
        assert_eq!(json, "\"spam\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::new("spam"));
    }
}
