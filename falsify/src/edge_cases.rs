//! Edge cases: small, ordered lists of boundary values tried before (or mixed into) random
//! generation.

use crate::shrinkable::{BoxedShrinkable, Shrinkable, Unshrinkable};

/// Ordered, finite list of shrinkable boundary values
pub struct EdgeCases<T> {
    cases: Vec<BoxedShrinkable<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        Self {
            cases: self.cases.clone(),
        }
    }
}

impl<T> Default for EdgeCases<T> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<T: Clone + 'static> EdgeCases<T> {
    /// No edge cases
    pub fn none() -> Self {
        Self::default()
    }

    /// Edge cases that keep their own shrinking behaviour
    pub fn from_shrinkables(cases: Vec<BoxedShrinkable<T>>) -> Self {
        Self { cases }
    }

    /// Edge cases that cannot be shrunk any further
    pub fn from_values(values: Vec<T>) -> Self {
        Self {
            cases: values
                .into_iter()
                .map(|value| Unshrinkable::new(value).boxed())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoxedShrinkable<T>> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoxedShrinkable<T>> {
        self.cases.iter()
    }

    /// Plain values of all edge cases, in order
    pub fn values(&self) -> Vec<T> {
        self.cases.iter().map(|case| case.value().clone()).collect()
    }

    pub fn map<U, F>(self, mapper: F) -> EdgeCases<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + Clone + 'static,
    {
        EdgeCases {
            cases: self
                .cases
                .into_iter()
                .map(|case| case.map(mapper.clone()))
                .collect(),
        }
    }

    /// Drop cases whose value fails `predicate`; surviving cases shrink within the filter
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Clone + 'static,
    {
        Self {
            cases: self
                .cases
                .into_iter()
                .filter(|case| predicate(case.value()))
                .map(|case| case.filter(predicate.clone()))
                .collect(),
        }
    }

    /// These edge cases followed by `other`'s
    pub fn concat(mut self, other: EdgeCases<T>) -> Self {
        self.cases.extend(other.cases);
        self
    }

    /// Keep at most `max` edge cases
    pub fn limit(mut self, max: usize) -> Self {
        self.cases.truncate(max);
        self
    }
}

impl<T> IntoIterator for EdgeCases<T> {
    type Item = BoxedShrinkable<T>;
    type IntoIter = std::vec::IntoIter<BoxedShrinkable<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}
