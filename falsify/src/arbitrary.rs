//! Arbitrary trait and its transformations.
//!
//! An arbitrary describes a domain of values and knows three ways of drawing from it:
//! random generation, exhaustive enumeration, and edge cases.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::edge_cases::EdgeCases;
use crate::error::GenerationError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::{BoxedGenerator, Generated};
use crate::random::RandomSource;

/// Number of consecutive rejected draws after which a filtered generator gives up
pub const MAX_FILTER_MISSES: usize = 10_000;

/// Size hint used when sampling outside of a property run
pub const DEFAULT_GEN_SIZE: usize = 1000;

/// A domain of values of type `T`.
///
/// Arbitraries are immutable descriptions and can be shared between threads. Generators,
/// exhaustive enumerations and shrinkables produced from them are single-threaded.
pub trait Arbitrary<T: Clone + 'static>: Send + Sync {
    /// Random generator; `gen_size` bounds how large generated values get
    fn generator(&self, gen_size: usize) -> BoxedGenerator<T>;

    /// Exhaustive enumeration, or `None` if the domain is unbounded or larger than
    /// `max_samples`
    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let _ = max_samples;
        None
    }

    /// At most `max_edge_cases` boundary values, in order
    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let _ = max_edge_cases;
        EdgeCases::none()
    }

    /// Draw a single value
    fn sample(&self, random: &mut RandomSource) -> Result<T, GenerationError> {
        let shrinkable = self.generator(DEFAULT_GEN_SIZE).next(random)?;
        Ok(shrinkable.value().clone())
    }

    /// Transform every value; shrinking still happens on the source value
    fn map<U, F>(self, mapper: F) -> Map<Self, T, F>
    where
        Self: Sized,
        U: Clone + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Map {
            arbitrary: self,
            mapper: Arc::new(mapper),
            _marker: PhantomData,
        }
    }

    /// Keep only values that satisfy `predicate`, during generation and shrinking alike
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Filter {
            arbitrary: self,
            predicate: Arc::new(predicate),
        }
    }

    /// Erase the concrete type
    fn boxed(self) -> BoxedArbitrary<T>
    where
        Self: Sized + 'static,
    {
        BoxedArbitrary::new(self)
    }
}

/// Type-erased, shareable arbitrary
pub struct BoxedArbitrary<T: Clone + 'static> {
    inner: Arc<dyn Arbitrary<T>>,
}

impl<T: Clone + 'static> Clone for BoxedArbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> BoxedArbitrary<T> {
    pub fn new<A: Arbitrary<T> + 'static>(arbitrary: A) -> Self {
        Self {
            inner: Arc::new(arbitrary),
        }
    }
}

impl<T: Clone + 'static> Arbitrary<T> for BoxedArbitrary<T> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<T> {
        self.inner.generator(gen_size)
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        self.inner.exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        self.inner.edge_cases(max_edge_cases)
    }

    fn boxed(self) -> BoxedArbitrary<T>
    where
        Self: Sized + 'static,
    {
        self
    }
}

/// Arbitrary produced by [`Arbitrary::map`]
pub struct Map<A, T, F> {
    arbitrary: A,
    mapper: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<A, T, U, F> Arbitrary<U> for Map<A, T, F>
where
    A: Arbitrary<T>,
    T: Clone + 'static,
    U: Clone + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    fn generator(&self, gen_size: usize) -> BoxedGenerator<U> {
        let source = self.arbitrary.generator(gen_size);
        let mapper = Arc::clone(&self.mapper);
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<U> {
            let mapper = Arc::clone(&mapper);
            Ok(source.next(random)?.map(move |value| mapper(value)))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<U>> {
        let mapper = Arc::clone(&self.mapper);
        self.arbitrary
            .exhaustive(max_samples)
            .map(|exhaustive| exhaustive.map(move |value| mapper(value)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<U> {
        let mapper = Arc::clone(&self.mapper);
        self.arbitrary
            .edge_cases(max_edge_cases)
            .map(move |value| mapper(value))
    }
}

/// Arbitrary produced by [`Arbitrary::filter`]
pub struct Filter<A, P> {
    arbitrary: A,
    predicate: Arc<P>,
}

impl<A, T, P> Arbitrary<T> for Filter<A, P>
where
    A: Arbitrary<T>,
    T: Clone + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn generator(&self, gen_size: usize) -> BoxedGenerator<T> {
        let source = self.arbitrary.generator(gen_size);
        let predicate = Arc::clone(&self.predicate);
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<T> {
            for _ in 0..MAX_FILTER_MISSES {
                let candidate = source.next(random)?;
                if predicate(candidate.value()) {
                    let predicate = Arc::clone(&predicate);
                    return Ok(candidate.filter(move |value| predicate(value)));
                }
            }
            Err(GenerationError::TooManyFilterMisses {
                misses: MAX_FILTER_MISSES,
            })
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        let predicate = Arc::clone(&self.predicate);
        self.arbitrary
            .exhaustive(max_samples)
            .map(|exhaustive| exhaustive.filter(move |value| predicate(value)))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let predicate = Arc::clone(&self.predicate);
        self.arbitrary
            .edge_cases(max_edge_cases)
            .filter(move |value| predicate(value))
    }
}
