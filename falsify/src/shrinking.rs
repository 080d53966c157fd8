//! Shrinking sequences: step-wise search for a minimal falsifying value.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::distance::ShrinkingDistance;
use crate::error::PropertyError;
use crate::falsifier::{Falsifier, TryExecutionResult};
use crate::shrinkable::{BoxedShrinkable, ShrinkCandidates};

/// A shrinkable whose value falsified the property, with the cause if one was reported
#[derive(Debug, Clone)]
pub struct FalsificationResult<T> {
    shrinkable: BoxedShrinkable<T>,
    cause: Option<PropertyError>,
}

impl<T> FalsificationResult<T> {
    pub fn new(shrinkable: BoxedShrinkable<T>, cause: Option<PropertyError>) -> Self {
        Self { shrinkable, cause }
    }

    pub fn value(&self) -> &T {
        self.shrinkable.value()
    }

    pub fn shrinkable(&self) -> &BoxedShrinkable<T> {
        &self.shrinkable
    }

    pub fn cause(&self) -> Option<&PropertyError> {
        self.cause.as_ref()
    }

    pub fn distance(&self) -> ShrinkingDistance {
        self.shrinkable.distance()
    }

    pub fn into_parts(self) -> (BoxedShrinkable<T>, Option<PropertyError>) {
        (self.shrinkable, self.cause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    Searching,
    Done,
}

/// Rejected candidates searched per step before the sequence gives up
pub const MAX_REJECTED_PER_STEP: usize = 10_000;

/// Greedy, deterministic shrinking of a falsifying shrinkable.
///
/// Each call to [`ShrinkingSequence::next`] looks for the first candidate of the current
/// value that still falsifies the property. Candidates that satisfy the property are
/// skipped. A candidate rejected as invalid is replaced by its own candidates, searched
/// depth-first, so a filter never hides simpler valid values behind an invalid one. Once no
/// candidate falsifies, the sequence is done and every further call returns `false`.
pub struct ShrinkingSequence<'f, T> {
    current: FalsificationResult<T>,
    falsifier: &'f dyn Falsifier<T>,
    state: SequenceState,
    steps: usize,
}

impl<'f, T: Clone + 'static> ShrinkingSequence<'f, T> {
    /// Start shrinking from a value known to falsify
    pub fn new(start: FalsificationResult<T>, falsifier: &'f dyn Falsifier<T>) -> Self {
        Self {
            current: start,
            falsifier,
            state: SequenceState::Searching,
            steps: 0,
        }
    }

    /// Advance by one successful shrinking step.
    ///
    /// On success `count` and `reporter` are called once and `true` is returned. Returns
    /// `false` when no simpler falsifying value exists.
    ///
    /// # Panics
    ///
    /// Panics if a shrinkable produces a candidate that is more distant than its parent.
    pub fn next(
        &mut self,
        mut count: impl FnMut(),
        mut reporter: impl FnMut(&FalsificationResult<T>),
    ) -> bool {
        if self.state == SequenceState::Done {
            return false;
        }
        let parent_distance = self.current.distance();
        let mut pending: Vec<ShrinkCandidates<T>> = vec![self.current.shrinkable().shrink()];
        let mut rejected = 0;

        while let Some(candidates) = pending.last_mut() {
            let Some(candidate) = candidates.next() else {
                pending.pop();
                continue;
            };
            let distance = candidate.distance();
            assert!(
                distance <= parent_distance,
                "shrink candidate at distance {} is further than its parent at {}",
                distance,
                parent_distance
            );
            match self.falsifier.execute(candidate.value()) {
                TryExecutionResult::Falsified(cause) => {
                    self.current = FalsificationResult::new(candidate, cause);
                    self.steps += 1;
                    trace!(step = self.steps, distance = %distance, "shrink step");
                    count();
                    reporter(&self.current);
                    return true;
                }
                TryExecutionResult::Satisfied => {}
                TryExecutionResult::Invalid => {
                    rejected += 1;
                    if rejected > MAX_REJECTED_PER_STEP {
                        debug!(rejected, step = self.steps, "too many rejected shrink candidates");
                        break;
                    }
                    pending.push(candidate.shrink());
                }
            }
        }

        self.state = SequenceState::Done;
        false
    }

    /// The simplest falsifying value found so far
    pub fn current(&self) -> &FalsificationResult<T> {
        &self.current
    }

    /// The failure attached to the current value
    pub fn cause(&self) -> Option<&PropertyError> {
        self.current.cause()
    }

    /// Successful steps taken so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.state == SequenceState::Done
    }

    pub fn into_current(self) -> FalsificationResult<T> {
        self.current
    }
}

impl<T: Clone + 'static> BoxedShrinkable<T> {
    /// Start a shrinking sequence from this (falsifying) shrinkable
    pub fn shrinking_sequence<'f>(&self, falsifier: &'f dyn Falsifier<T>) -> ShrinkingSequence<'f, T> {
        ShrinkingSequence::new(FalsificationResult::new(self.clone(), None), falsifier)
    }
}

/// Result of a shrinking operation
#[derive(Debug, Clone)]
pub struct ShrinkResult<T> {
    /// Original value that failed
    pub original: T,
    /// Minimal value that still fails
    pub minimal: T,
    /// Failure attached to the minimal value
    pub cause: Option<PropertyError>,
    /// Number of shrinking steps taken
    pub shrink_steps: usize,
    /// Time spent shrinking
    pub shrink_duration: Duration,
    /// Whether shrinking ran until no simpler value was found
    pub completed: bool,
}

impl<T: Clone> ShrinkResult<T> {
    /// Create a shrink result for when no shrinking was performed
    pub fn no_shrinking(original: &FalsificationResult<T>) -> Self {
        Self {
            original: original.value().clone(),
            minimal: original.value().clone(),
            cause: original.cause().cloned(),
            shrink_steps: 0,
            shrink_duration: Duration::ZERO,
            completed: false,
        }
    }
}

/// Drive a shrinking sequence until it is done or `max_steps` steps were taken
pub fn shrink_to_end<T: Clone + 'static>(
    start: FalsificationResult<T>,
    falsifier: &dyn Falsifier<T>,
    max_steps: Option<usize>,
    mut reporter: impl FnMut(&FalsificationResult<T>),
) -> ShrinkResult<T> {
    let start_time = Instant::now();
    let original = start.value().clone();
    let mut sequence = ShrinkingSequence::new(start, falsifier);

    let completed = loop {
        if max_steps.is_some_and(|max| sequence.steps() >= max) {
            debug!(steps = sequence.steps(), "shrinking stopped at step limit");
            break false;
        }
        if !sequence.next(|| {}, &mut reporter) {
            break true;
        }
    };

    let shrink_steps = sequence.steps();
    let minimal = sequence.into_current();
    let shrink_duration = start_time.elapsed();
    debug!(
        steps = shrink_steps,
        completed,
        duration_ms = shrink_duration.as_millis() as u64,
        "shrinking finished"
    );
    ShrinkResult {
        original,
        minimal: minimal.value().clone(),
        cause: minimal.cause().cloned(),
        shrink_steps,
        shrink_duration,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falsifier::checked;
    use crate::primitives::ShrinkableInteger;
    use crate::shrinkable::{ShrinkCandidates, Shrinkable};

    fn integer(value: i64) -> BoxedShrinkable<i64> {
        ShrinkableInteger::new(value, 0, (i64::MIN, i64::MAX)).boxed()
    }

    #[test]
    fn test_shrinks_integer_to_boundary() {
        let falsifier = |n: &i64| *n < 37;
        let start = FalsificationResult::new(integer(1000), None);
        let result = shrink_to_end(start, &falsifier, None, |_| {});
        assert_eq!(result.original, 1000);
        assert_eq!(result.minimal, 37);
        assert!(result.completed);
        assert!(result.shrink_steps > 0);
    }

    #[test]
    fn test_next_reports_each_step() {
        let falsifier = |_: &i64| false;
        let shrinkable = integer(10);
        let mut sequence = shrinkable.shrinking_sequence(&falsifier);
        let mut counted = 0;
        let mut reported = Vec::new();
        assert!(sequence.next(|| counted += 1, |r| reported.push(*r.value())));
        assert_eq!(*sequence.current().value(), 0);
        assert!(!sequence.next(|| counted += 1, |r| reported.push(*r.value())));
        assert!(sequence.is_done());
        assert!(!sequence.next(|| counted += 1, |_| {}));
        assert_eq!(counted, 1);
        assert_eq!(reported, vec![0]);
    }

    #[test]
    fn test_step_limit() {
        let falsifier = |n: &i64| *n < 1;
        let start = FalsificationResult::new(integer(1 << 40), None);
        let result = shrink_to_end(start, &falsifier, Some(3), |_| {});
        assert_eq!(result.shrink_steps, 3);
        assert!(!result.completed);
        assert!(result.minimal >= 1);
    }

    #[test]
    fn test_cause_follows_current_value() {
        let falsifier = checked(|n: &i64| {
            if *n >= 5 {
                Err(PropertyError::property_failed(format!("{} is too big", n)))
            } else {
                Ok(())
            }
        });
        let start = FalsificationResult::new(integer(100), None);
        let result = shrink_to_end(start, &falsifier, None, |_| {});
        assert_eq!(result.minimal, 5);
        assert_eq!(result.cause.unwrap().message(), "5 is too big");
    }

    #[test]
    fn test_invalid_candidates_are_skipped() {
        let falsifier = (|_: &i64| false).with_filter(|n: &i64| n % 2 == 1);
        let start = FalsificationResult::new(integer(9), None);
        let mut steps = Vec::new();
        let result = shrink_to_end(start, &falsifier, None, |r| steps.push(*r.value()));
        assert!(steps.iter().all(|n| n % 2 == 1));
        assert_eq!(result.minimal, 1);
    }

    #[test]
    fn test_rejected_candidates_are_searched_further() {
        // 100 -> 0 and 50 are rejected, but 25 below 50 is a valid falsifying value
        let falsifier = (|n: &i64| *n < 20).with_filter(|n: &i64| n % 25 == 0 && *n != 0 && *n != 50);
        let start = FalsificationResult::new(integer(100), None);
        let mut reported = Vec::new();
        let result = shrink_to_end(start, &falsifier, None, |r| reported.push(*r.value()));
        assert_eq!(result.minimal, 25);
        assert!(reported.iter().all(|n| n % 25 == 0 && *n != 50));
    }

    #[test]
    fn test_rejection_budget_ends_the_sequence() {
        let falsifier = (|_: &i64| false).with_filter(|_: &i64| false);
        let mut sequence = integer(i64::MAX).shrinking_sequence(&falsifier);
        assert!(!sequence.next(|| {}, |_| {}));
        assert!(sequence.is_done());
        assert_eq!(*sequence.current().value(), i64::MAX);
    }

    struct Growing;

    impl Shrinkable<u8> for Growing {
        fn value(&self) -> &u8 {
            &1
        }

        fn distance(&self) -> ShrinkingDistance {
            ShrinkingDistance::of(&[1])
        }

        fn shrink(&self) -> ShrinkCandidates<u8> {
            let further = crate::shrinkable::Unshrinkable::with_distance(2, ShrinkingDistance::of(&[5]));
            Box::new(std::iter::once(further.boxed()))
        }
    }

    #[test]
    #[should_panic(expected = "further than its parent")]
    fn test_growing_candidates_are_defects() {
        let falsifier = |_: &u8| false;
        let shrinkable = Growing.boxed();
        let mut sequence = shrinkable.shrinking_sequence(&falsifier);
        sequence.next(|| {}, |_| {});
    }
}
