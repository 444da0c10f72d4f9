//! Bounded sorted list used for k-nearest and top-k selections.

use std::cmp::Ordering;

/// A list that keeps at most `limit` elements in ascending order.
///
/// An element is inserted before the first element that compares strictly
/// greater, so equal elements keep their insertion order. When the list is
/// full, the greatest element is dropped.
pub struct BoundedSortedList<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    limit: usize,
    elements: Vec<E>,
    compare: F,
}

impl<E, F> BoundedSortedList<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    /// Create a list that keeps at most `limit` elements ordered by `compare`.
    pub fn new(limit: usize, compare: F) -> Self {
        BoundedSortedList {
            limit,
            elements: Vec::with_capacity(limit.min(1024)),
            compare,
        }
    }

    /// Offer an element to the list.
    pub fn push(&mut self, element: E) {
        if self.limit == 0 {
            return;
        }
        if self.elements.len() == self.limit {
            // Full and not smaller than the current maximum.
            if let Some(last) = self.elements.last() {
                if (self.compare)(&element, last) != Ordering::Less {
                    return;
                }
            }
        }
        let position = self
            .elements
            .partition_point(|existing| (self.compare)(existing, &element) != Ordering::Greater);
        self.elements.insert(position, element);
        self.elements.truncate(self.limit);
    }

    /// Number of kept elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element has been kept.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The kept elements in ascending order.
    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// Consume the list, returning the kept elements in ascending order.
    pub fn into_vec(self) -> Vec<E> {
        self.elements
    }
}
