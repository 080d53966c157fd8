//! Shrinkable values: a generated value bundled with its simplicity distance and the
//! capability to produce simpler candidates.

use std::fmt;
use std::rc::Rc;

use crate::distance::ShrinkingDistance;

/// Lazy, finite sequence of shrink candidates, simplest first.
pub type ShrinkCandidates<T> = Box<dyn Iterator<Item = BoxedShrinkable<T>>>;

/// A generated value that knows how to produce simpler versions of itself.
///
/// Implementations must uphold two invariants:
/// - the candidate sequence is finite and never contains the value itself;
/// - every candidate's distance is strictly smaller than the parent's, which is what
///   guarantees that repeated shrinking terminates.
pub trait Shrinkable<T> {
    /// The generated value
    fn value(&self) -> &T;

    /// How far this value is from the simplest value of its domain
    fn distance(&self) -> ShrinkingDistance;

    /// Candidates that are simpler than this value, simplest first
    fn shrink(&self) -> ShrinkCandidates<T>;

    /// Wrap into a shareable handle
    fn boxed(self) -> BoxedShrinkable<T>
    where
        Self: Sized + 'static,
        T: Clone + 'static,
    {
        BoxedShrinkable::new(self)
    }
}

/// Cheaply clonable handle to a shrinkable.
///
/// Handles are immutable: mapping or filtering creates a new shrinkable and leaves the source
/// untouched.
pub struct BoxedShrinkable<T> {
    inner: Rc<dyn Shrinkable<T>>,
}

impl<T> Clone for BoxedShrinkable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BoxedShrinkable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shrinkable")
            .field("value", self.inner.value())
            .field("distance", &self.inner.distance())
            .finish()
    }
}

impl<T> BoxedShrinkable<T> {
    /// The generated value
    pub fn value(&self) -> &T {
        self.inner.value()
    }

    /// The simplicity distance
    pub fn distance(&self) -> ShrinkingDistance {
        self.inner.distance()
    }

    /// Simpler candidates, simplest first
    pub fn shrink(&self) -> ShrinkCandidates<T> {
        self.inner.shrink()
    }
}

impl<T: Clone + 'static> BoxedShrinkable<T> {
    /// Box a shrinkable implementation
    pub fn new<S: Shrinkable<T> + 'static>(shrinkable: S) -> Self {
        Self {
            inner: Rc::new(shrinkable),
        }
    }

    /// Derive a shrinkable of another type; shrinking follows the source lazily
    pub fn map<U, F>(&self, mapper: F) -> BoxedShrinkable<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        MappedShrinkable::new(self.clone(), Rc::new(mapper)).boxed()
    }

    /// Skip every shrink candidate that does not satisfy `predicate`
    pub fn filter<P>(&self, predicate: P) -> BoxedShrinkable<T>
    where
        P: Fn(&T) -> bool + 'static,
    {
        FilteredShrinkable {
            source: self.clone(),
            predicate: Rc::new(predicate),
        }
        .boxed()
    }
}

/// A value with no simpler candidates
#[derive(Debug, Clone)]
pub struct Unshrinkable<T> {
    value: T,
    distance: ShrinkingDistance,
}

impl<T> Unshrinkable<T> {
    /// An unshrinkable value at distance zero
    pub fn new(value: T) -> Self {
        Self {
            value,
            distance: ShrinkingDistance::zero(),
        }
    }

    /// An unshrinkable value that still reports a distance
    pub fn with_distance(value: T, distance: ShrinkingDistance) -> Self {
        Self { value, distance }
    }
}

impl<T: Clone + 'static> Shrinkable<T> for Unshrinkable<T> {
    fn value(&self) -> &T {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        self.distance.clone()
    }

    fn shrink(&self) -> ShrinkCandidates<T> {
        Box::new(std::iter::empty())
    }
}

type Mapper<S, T> = Rc<dyn Fn(S) -> T>;

struct MappedShrinkable<S, T> {
    source: BoxedShrinkable<S>,
    mapper: Mapper<S, T>,
    value: T,
}

impl<S: Clone + 'static, T: Clone + 'static> MappedShrinkable<S, T> {
    fn new(source: BoxedShrinkable<S>, mapper: Mapper<S, T>) -> Self {
        let value = mapper(source.value().clone());
        Self {
            source,
            mapper,
            value,
        }
    }
}

impl<S: Clone + 'static, T: Clone + 'static> Shrinkable<T> for MappedShrinkable<S, T> {
    fn value(&self) -> &T {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkCandidates<T> {
        let mapper = Rc::clone(&self.mapper);
        Box::new(
            self.source
                .shrink()
                .map(move |candidate| MappedShrinkable::new(candidate, Rc::clone(&mapper)).boxed()),
        )
    }
}

struct FilteredShrinkable<T> {
    source: BoxedShrinkable<T>,
    predicate: Rc<dyn Fn(&T) -> bool>,
}

impl<T: Clone + 'static> Shrinkable<T> for FilteredShrinkable<T> {
    fn value(&self) -> &T {
        self.source.value()
    }

    fn distance(&self) -> ShrinkingDistance {
        self.source.distance()
    }

    fn shrink(&self) -> ShrinkCandidates<T> {
        let predicate = Rc::clone(&self.predicate);
        let wrap_predicate = Rc::clone(&self.predicate);
        Box::new(
            self.source
                .shrink()
                .filter(move |candidate| predicate(candidate.value()))
                .map(move |candidate| {
                    FilteredShrinkable {
                        source: candidate,
                        predicate: Rc::clone(&wrap_predicate),
                    }
                    .boxed()
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ShrinkableInteger;

    fn values<T: Clone + 'static>(candidates: ShrinkCandidates<T>) -> Vec<T> {
        candidates.map(|c| c.value().clone()).collect()
    }

    #[test]
    fn test_unshrinkable_has_no_candidates() {
        let shrinkable = Unshrinkable::new("fixed").boxed();
        assert_eq!(*shrinkable.value(), "fixed");
        assert!(shrinkable.distance().is_zero());
        assert_eq!(shrinkable.shrink().count(), 0);
    }

    #[test]
    fn test_map_keeps_distance_and_maps_candidates() {
        let source = ShrinkableInteger::new(3i32, 0, (0, 10)).boxed();
        let mapped = source.map(|n| format!("#{}", n));

        assert_eq!(mapped.value(), "#3");
        assert_eq!(mapped.distance(), source.distance());
        assert_eq!(values(mapped.shrink()), vec!["#0", "#1", "#2"]);
        // the source is not affected by mapping
        assert_eq!(*source.value(), 3);
    }

    #[test]
    fn test_mapped_candidates_shrink_further() {
        let mapped = ShrinkableInteger::new(8u8, 0, (0, 10)).boxed().map(|n| n * 2);
        let closest = mapped.shrink().last().unwrap();
        assert_eq!(*closest.value(), 14);
        assert_eq!(values(closest.shrink()), vec![0, 6, 10, 12]);
    }

    #[test]
    fn test_filter_skips_rejected_candidates() {
        let filtered = ShrinkableInteger::new(10i64, 0, (0, 100))
            .boxed()
            .filter(|n| n % 2 == 1);
        let candidates = values(filtered.shrink());
        assert!(candidates.iter().all(|n| n % 2 == 1));
        assert_eq!(candidates, vec![5, 7, 9]);

        // filtering applies recursively
        let seven = filtered.shrink().nth(1).unwrap();
        assert!(values(seven.shrink()).iter().all(|n| n % 2 == 1));
    }
}
