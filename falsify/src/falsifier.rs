//! Falsifiers: the predicates under test.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::PropertyError;

/// Outcome of checking a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryExecutionResult {
    /// The property holds for the value
    Satisfied,
    /// The property does not hold; the cause is attached when one was reported
    Falsified(Option<PropertyError>),
    /// The value was rejected by a filter or assumption and says nothing about the property
    Invalid,
}

impl TryExecutionResult {
    /// Whether the value falsified the property
    pub fn is_falsified(&self) -> bool {
        matches!(self, TryExecutionResult::Falsified(_))
    }
}

/// A property check over values of type `T`.
///
/// Closures of type `Fn(&T) -> bool` are falsifiers: returning `false` falsifies. Panics in
/// user code are caught and reported as a falsification carrying the panic message.
pub trait Falsifier<T> {
    /// Check the property for one value
    fn execute(&self, value: &T) -> TryExecutionResult;

    /// Treat values rejected by `filter` as invalid instead of checking them
    fn with_filter<P>(self, filter: P) -> FilteredFalsifier<Self, P>
    where
        Self: Sized,
        P: Fn(&T) -> bool,
    {
        FilteredFalsifier {
            falsifier: self,
            filter,
        }
    }
}

impl<T, F> Falsifier<T> for F
where
    F: Fn(&T) -> bool,
{
    fn execute(&self, value: &T) -> TryExecutionResult {
        match catch_unwind(AssertUnwindSafe(|| self(value))) {
            Ok(true) => TryExecutionResult::Satisfied,
            Ok(false) => TryExecutionResult::Falsified(None),
            Err(payload) => {
                TryExecutionResult::Falsified(Some(PropertyError::from_panic(payload.as_ref())))
            }
        }
    }
}

/// Falsifier built from a check that reports failures as errors
pub struct Checked<F> {
    check: F,
}

/// Adapt a `Fn(&T) -> Result<(), PropertyError>` into a falsifier
pub fn checked<T, F>(check: F) -> Checked<F>
where
    F: Fn(&T) -> Result<(), PropertyError>,
{
    Checked { check }
}

impl<T, F> Falsifier<T> for Checked<F>
where
    F: Fn(&T) -> Result<(), PropertyError>,
{
    fn execute(&self, value: &T) -> TryExecutionResult {
        match catch_unwind(AssertUnwindSafe(|| (self.check)(value))) {
            Ok(Ok(())) => TryExecutionResult::Satisfied,
            Ok(Err(error)) => TryExecutionResult::Falsified(Some(error)),
            Err(payload) => {
                TryExecutionResult::Falsified(Some(PropertyError::from_panic(payload.as_ref())))
            }
        }
    }
}

/// A falsifier guarded by a precondition
pub struct FilteredFalsifier<F, P> {
    falsifier: F,
    filter: P,
}

impl<T, F, P> Falsifier<T> for FilteredFalsifier<F, P>
where
    F: Falsifier<T>,
    P: Fn(&T) -> bool,
{
    fn execute(&self, value: &T) -> TryExecutionResult {
        if !(self.filter)(value) {
            return TryExecutionResult::Invalid;
        }
        self.falsifier.execute(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_falsifier() {
        let falsifier = |s: &String| s.is_empty();
        assert_eq!(
            falsifier.execute(&String::new()),
            TryExecutionResult::Satisfied
        );
        assert_eq!(
            falsifier.execute(&"x".to_string()),
            TryExecutionResult::Falsified(None)
        );
    }

    #[test]
    fn test_panics_become_falsifications() {
        let falsifier = |n: &i32| {
            assert!(*n < 10, "too big: {}", n);
            true
        };
        match falsifier.execute(&11) {
            TryExecutionResult::Falsified(Some(PropertyError::Panicked { message })) => {
                assert_eq!(message, "too big: 11");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(falsifier.execute(&1), TryExecutionResult::Satisfied);
    }

    #[test]
    fn test_checked_falsifier_keeps_cause() {
        let falsifier = checked(|n: &u32| {
            if n % 2 == 0 {
                Ok(())
            } else {
                Err(PropertyError::property_failed(format!("{} is odd", n)))
            }
        });
        assert!(!falsifier.execute(&4).is_falsified());
        assert_eq!(
            falsifier.execute(&3),
            TryExecutionResult::Falsified(Some(PropertyError::property_failed("3 is odd")))
        );
    }

    #[test]
    fn test_filtered_falsifier_marks_rejected_values_invalid() {
        let falsifier = (|_: &i32| false).with_filter(|n: &i32| *n > 0);
        assert_eq!(falsifier.execute(&-1), TryExecutionResult::Invalid);
        assert!(falsifier.execute(&1).is_falsified());
    }
}
