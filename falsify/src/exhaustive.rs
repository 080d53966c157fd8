//! Exhaustive generation: finite, deterministic, restartable enumeration of a domain.

use std::fmt;
use std::rc::Rc;

type Supplier<T> = Rc<dyn Fn() -> Box<dyn Iterator<Item = T>>>;

/// Enumerates every value of a (bounded) domain in a fixed order.
///
/// `max_count` is an upper bound on the number of values. It is exact unless the generator
/// was filtered, in which case [`ExhaustiveGenerator::count`] returns `None`.
pub struct ExhaustiveGenerator<T> {
    max_count: u64,
    exact: bool,
    supplier: Supplier<T>,
}

impl<T> Clone for ExhaustiveGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            max_count: self.max_count,
            exact: self.exact,
            supplier: Rc::clone(&self.supplier),
        }
    }
}

impl<T> fmt::Debug for ExhaustiveGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExhaustiveGenerator")
            .field("max_count", &self.max_count)
            .field("exact", &self.exact)
            .finish()
    }
}

impl<T: 'static> ExhaustiveGenerator<T> {
    /// Create a generator from an iterator supplier that yields exactly `count` values
    pub fn new<F, I>(count: u64, supplier: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = T> + 'static,
    {
        Self {
            max_count: count,
            exact: true,
            supplier: Rc::new(move || Box::new(supplier())),
        }
    }

    /// Enumerate a fixed list of values in order
    pub fn from_values(values: Vec<T>) -> Self
    where
        T: Clone,
    {
        let values = Rc::new(values);
        let count = values.len() as u64;
        Self::new(count, move || {
            let values = Rc::clone(&values);
            (0..values.len()).map(move |i| values[i].clone())
        })
    }

    /// Exact number of values, if known
    pub fn count(&self) -> Option<u64> {
        self.exact.then_some(self.max_count)
    }

    /// Upper bound on the number of values
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Start a fresh enumeration
    pub fn iter(&self) -> Box<dyn Iterator<Item = T>> {
        (self.supplier)()
    }

    /// `None` when this generator could produce more than `max_samples` values
    pub fn within(self, max_samples: u64) -> Option<Self> {
        (self.max_count <= max_samples).then_some(self)
    }

    /// Treat the count as an upper bound only
    pub fn as_upper_bound(mut self) -> Self {
        self.exact = false;
        self
    }

    /// Transform every enumerated value
    pub fn map<U, F>(self, mapper: F) -> ExhaustiveGenerator<U>
    where
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        let supplier = self.supplier;
        let mapper = Rc::new(mapper);
        ExhaustiveGenerator {
            max_count: self.max_count,
            exact: self.exact,
            supplier: Rc::new(move || {
                let mapper = Rc::clone(&mapper);
                Box::new(supplier().map(move |value| mapper(value)))
            }),
        }
    }

    /// Keep only values satisfying `predicate`; the count becomes an upper bound
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        let supplier = self.supplier;
        let predicate = Rc::new(predicate);
        Self {
            max_count: self.max_count,
            exact: false,
            supplier: Rc::new(move || {
                let predicate = Rc::clone(&predicate);
                Box::new(supplier().filter(move |value| predicate(value)))
            }),
        }
    }
}

/// Cartesian product of `generators` in lexicographic index order: the first generator
/// varies slowest.
///
/// Returns `None` if the product size overflows or exceeds `max_samples`.
pub fn product<T: Clone + 'static>(
    generators: Vec<ExhaustiveGenerator<T>>,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<Vec<T>>> {
    let mut max_count: u64 = 1;
    for generator in &generators {
        max_count = max_count.checked_mul(generator.max_count())?;
    }
    if max_count > max_samples {
        return None;
    }
    let exact = generators.iter().all(|g| g.count().is_some());
    let generators = Rc::new(generators);
    Some(ExhaustiveGenerator {
        max_count,
        exact,
        supplier: Rc::new(move || Box::new(ProductIterator::new(Rc::clone(&generators)))),
    })
}

/// Odometer over several restartable enumerations
struct ProductIterator<T> {
    generators: Rc<Vec<ExhaustiveGenerator<T>>>,
    iterators: Vec<Box<dyn Iterator<Item = T>>>,
    current: Vec<T>,
    started: bool,
    done: bool,
}

impl<T: Clone + 'static> ProductIterator<T> {
    fn new(generators: Rc<Vec<ExhaustiveGenerator<T>>>) -> Self {
        Self {
            generators,
            iterators: Vec::new(),
            current: Vec::new(),
            started: false,
            done: false,
        }
    }

    fn start(&mut self) -> Option<Vec<T>> {
        self.started = true;
        for generator in self.generators.iter() {
            let mut iterator = generator.iter();
            let first = iterator.next()?;
            self.iterators.push(iterator);
            self.current.push(first);
        }
        Some(self.current.clone())
    }

    fn advance(&mut self) -> Option<Vec<T>> {
        let mut position = self.iterators.len();
        while position > 0 {
            position -= 1;
            if let Some(value) = self.iterators[position].next() {
                self.current[position] = value;
                return Some(self.current.clone());
            }
            // this position wraps around and the one before it advances
            let mut restarted = self.generators[position].iter();
            self.current[position] = restarted.next()?;
            self.iterators[position] = restarted;
        }
        None
    }
}

impl<T: Clone + 'static> Iterator for ProductIterator<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let next = if self.started {
            self.advance()
        } else {
            self.start()
        };
        if next.is_none() {
            self.done = true;
        }
        next
    }
}
