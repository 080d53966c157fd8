//! Shrinking distance: the measure used to rank values by simplicity.

use std::cmp::Ordering;
use std::fmt;

use crate::shrinkable::BoxedShrinkable;

/// An ordered vector of non-negative dimensions.
///
/// Distances compare lexicographically. Missing trailing dimensions count as zero, so
/// `[1]` and `[1, 0]` are equal. Smaller means simpler.
#[derive(Debug, Clone, Default)]
pub struct ShrinkingDistance {
    dimensions: Vec<u64>,
}

impl ShrinkingDistance {
    /// Distance with the given dimensions
    pub fn of(dimensions: &[u64]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
        }
    }

    /// The simplest possible distance
    pub fn zero() -> Self {
        Self::default()
    }

    /// Dimensions of this distance
    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    /// Whether every dimension is zero
    pub fn is_zero(&self) -> bool {
        self.dimensions.iter().all(|&d| d == 0)
    }

    /// Element-wise saturating sum; the longer distance keeps its extra dimensions
    pub fn plus(&self, other: &ShrinkingDistance) -> Self {
        let len = self.dimensions.len().max(other.dimensions.len());
        let dimensions = (0..len)
            .map(|i| {
                let left = self.dimensions.get(i).copied().unwrap_or(0);
                let right = other.dimensions.get(i).copied().unwrap_or(0);
                left.saturating_add(right)
            })
            .collect();
        Self { dimensions }
    }

    /// Concatenation of both distances
    pub fn append(&self, other: &ShrinkingDistance) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.extend_from_slice(&other.dimensions);
        Self { dimensions }
    }

    /// Distance of a collection: its length followed by the summed element distances
    pub fn for_collection<E>(elements: &[BoxedShrinkable<E>]) -> Self {
        let summed = elements
            .iter()
            .fold(ShrinkingDistance::zero(), |acc, e| acc.plus(&e.distance()));
        ShrinkingDistance::of(&[elements.len() as u64]).append(&summed)
    }

    /// Distance of independently shrinkable parts: their distances concatenated
    pub fn combine<V>(parts: &[BoxedShrinkable<V>]) -> Self {
        parts
            .iter()
            .fold(ShrinkingDistance::zero(), |acc, p| acc.append(&p.distance()))
    }
}

impl PartialEq for ShrinkingDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ShrinkingDistance {}

impl PartialOrd for ShrinkingDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShrinkingDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.dimensions.len().max(other.dimensions.len());
        for i in 0..len {
            let left = self.dimensions.get(i).copied().unwrap_or(0);
            let right = other.dimensions.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for ShrinkingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dimensions)
    }
}
