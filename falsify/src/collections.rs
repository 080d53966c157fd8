//! Container arbitraries: strings and vectors built from an element arbitrary.

use std::rc::Rc;
use std::sync::Arc;

use rand::Rng;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::{ExhaustiveGenerator, product};
use crate::generator::{BoxedGenerator, Generated};
use crate::primitives::chars;
use crate::random::RandomSource;
use crate::shrinkable::{BoxedShrinkable, ShrinkCandidates, Shrinkable};

/// Default upper bound on generated container sizes
pub const DEFAULT_MAX_SIZE: usize = 255;

type Builder<E, C> = Rc<dyn Fn(Vec<E>) -> C>;

/// A container of shrinkable elements with a minimum size.
///
/// Shrinking first tries to drop single elements (never below `min_size`), most distant
/// element first, then shrinks elements one at a time in index order.
pub struct ShrinkableContainer<E, C> {
    elements: Vec<BoxedShrinkable<E>>,
    min_size: usize,
    builder: Builder<E, C>,
    value: C,
}

impl<E: Clone + 'static, C: Clone + 'static> ShrinkableContainer<E, C> {
    pub fn new<B>(elements: Vec<BoxedShrinkable<E>>, min_size: usize, builder: B) -> Self
    where
        B: Fn(Vec<E>) -> C + 'static,
    {
        Self::with_builder(elements, min_size, Rc::new(builder))
    }

    fn with_builder(elements: Vec<BoxedShrinkable<E>>, min_size: usize, builder: Builder<E, C>) -> Self {
        let value = builder(elements.iter().map(|e| e.value().clone()).collect());
        Self {
            elements,
            min_size,
            builder,
            value,
        }
    }

    pub fn elements(&self) -> &[BoxedShrinkable<E>] {
        &self.elements
    }

    fn removal_order(&self) -> Vec<usize> {
        if self.elements.len() <= self.min_size {
            return Vec::new();
        }
        let distances: Vec<ShrinkingDistance> =
            self.elements.iter().map(|e| e.distance()).collect();
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by(|&a, &b| distances[b].cmp(&distances[a]).then(b.cmp(&a)));
        order
    }
}

impl<E: Clone + 'static, C: Clone + 'static> Shrinkable<C> for ShrinkableContainer<E, C> {
    fn value(&self) -> &C {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::for_collection(&self.elements)
    }

    fn shrink(&self) -> ShrinkCandidates<C> {
        let elements = Rc::new(self.elements.clone());
        let min_size = self.min_size;

        let removal_elements = Rc::clone(&elements);
        let removal_builder = Rc::clone(&self.builder);
        let removals = self.removal_order().into_iter().map(move |index| {
            let mut remaining = removal_elements.as_ref().clone();
            remaining.remove(index);
            ShrinkableContainer::with_builder(remaining, min_size, Rc::clone(&removal_builder))
                .boxed()
        });

        let builder = Rc::clone(&self.builder);
        let element_shrinks = (0..elements.len()).flat_map(move |index| {
            let elements = Rc::clone(&elements);
            let builder = Rc::clone(&builder);
            let candidates = elements[index].shrink();
            candidates.map(move |candidate| {
                let mut replaced = elements.as_ref().clone();
                replaced[index] = candidate;
                ShrinkableContainer::with_builder(replaced, min_size, Rc::clone(&builder)).boxed()
            })
        });

        Box::new(removals.chain(element_shrinks))
    }
}

/// Shrinkable string from shrinkable characters
pub fn shrinkable_string(chars: Vec<BoxedShrinkable<char>>, min_length: usize) -> BoxedShrinkable<String> {
    ShrinkableContainer::new(chars, min_length, |chars: Vec<char>| chars.into_iter().collect())
        .boxed()
}

/// Shrinkable vector from shrinkable elements
pub fn shrinkable_vec<E: Clone + 'static>(
    elements: Vec<BoxedShrinkable<E>>,
    min_size: usize,
) -> BoxedShrinkable<Vec<E>> {
    ShrinkableContainer::new(elements, min_size, |elements: Vec<E>| elements).boxed()
}

/// Containers of type `C` holding between `min_size` and `max_size` elements
pub struct ContainerArbitrary<E: Clone + 'static, C> {
    element: BoxedArbitrary<E>,
    min_size: usize,
    max_size: usize,
    builder: Arc<dyn Fn(Vec<E>) -> C + Send + Sync>,
}

impl<E: Clone + 'static, C> Clone for ContainerArbitrary<E, C> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            min_size: self.min_size,
            max_size: self.max_size,
            builder: Arc::clone(&self.builder),
        }
    }
}

/// Strings of arbitrary characters
pub type StringArbitrary = ContainerArbitrary<char, String>;

/// Vectors of arbitrary elements
pub type VecArbitrary<E> = ContainerArbitrary<E, Vec<E>>;

/// Strings of up to [`DEFAULT_MAX_SIZE`] characters from [`chars`]
pub fn strings() -> StringArbitrary {
    ContainerArbitrary {
        element: chars().boxed(),
        min_size: 0,
        max_size: DEFAULT_MAX_SIZE,
        builder: Arc::new(|chars: Vec<char>| chars.into_iter().collect()),
    }
}

/// Vectors of up to [`DEFAULT_MAX_SIZE`] elements drawn from `element`
pub fn vecs<E, A>(element: A) -> VecArbitrary<E>
where
    E: Clone + 'static,
    A: Arbitrary<E> + 'static,
{
    ContainerArbitrary {
        element: element.boxed(),
        min_size: 0,
        max_size: DEFAULT_MAX_SIZE,
        builder: Arc::new(|elements: Vec<E>| elements),
    }
}

impl<E: Clone + 'static, C: Clone + 'static> ContainerArbitrary<E, C> {
    pub fn of_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = self.max_size.max(min_size);
        self
    }

    pub fn of_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self.min_size = self.min_size.min(max_size);
        self
    }

    pub fn of_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self.max_size = size;
        self
    }

    fn local_builder(&self) -> Builder<E, C> {
        let builder = Arc::clone(&self.builder);
        Rc::new(move |elements: Vec<E>| builder(elements))
    }

    fn container(&self, elements: Vec<BoxedShrinkable<E>>) -> BoxedShrinkable<C> {
        ShrinkableContainer::with_builder(elements, self.min_size, self.local_builder()).boxed()
    }
}

impl StringArbitrary {
    /// Draw characters from `chars` instead of the full unicode range
    pub fn with_chars<A: Arbitrary<char> + 'static>(mut self, chars: A) -> Self {
        self.element = chars.boxed();
        self
    }

    pub fn of_min_length(self, min_length: usize) -> Self {
        self.of_min_size(min_length)
    }

    pub fn of_max_length(self, max_length: usize) -> Self {
        self.of_max_size(max_length)
    }

    pub fn of_length(self, length: usize) -> Self {
        self.of_size(length)
    }
}

impl<E, C> Arbitrary<C> for ContainerArbitrary<E, C>
where
    E: Clone + 'static,
    C: Clone + 'static,
{
    fn generator(&self, gen_size: usize) -> BoxedGenerator<C> {
        let this = self.clone();
        let elements = self.element.generator(gen_size);
        let max_len = self.max_size.min(self.min_size.saturating_add(gen_size));
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<C> {
            let len = random.gen_range(this.min_size..=max_len);
            let drawn = elements.samples(random, len)?;
            Ok(this.container(drawn))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<C>> {
        let element = self.element.exhaustive(max_samples)?;
        // with no element values only the empty container can exist
        let max_len = if element.max_count() == 0 {
            self.min_size
        } else {
            self.max_size
        };

        let mut by_length = Vec::new();
        let mut total: u64 = 0;
        for len in self.min_size..=max_len {
            let of_len = product(vec![element.clone(); len], max_samples)?;
            total = total.checked_add(of_len.max_count())?;
            if total > max_samples {
                return None;
            }
            by_length.push(of_len);
        }

        let builder = Arc::clone(&self.builder);
        let by_length = Rc::new(by_length);
        let shortlex = ExhaustiveGenerator::new(total, move || {
            let by_length = Rc::clone(&by_length);
            let builder = Arc::clone(&builder);
            (0..by_length.len())
                .flat_map(move |len| by_length[len].iter())
                .map(move |elements| builder(elements))
        });
        Some(if element.count().is_some() {
            shortlex
        } else {
            shortlex.as_upper_bound()
        })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<C> {
        let element_edges = self.element.edge_cases(max_edge_cases);
        let mut cases = Vec::new();
        if self.min_size == 0 {
            cases.push(self.container(Vec::new()));
        }
        if self.min_size <= 1 && self.max_size >= 1 {
            cases.extend(element_edges.iter().map(|edge| self.container(vec![edge.clone()])));
        } else if self.min_size > 1 {
            if let Some(first) = element_edges.get(0) {
                cases.push(self.container(vec![first.clone(); self.min_size]));
            }
        }
        EdgeCases::from_shrinkables(cases).limit(max_edge_cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{ShrinkableInteger, integers};

    fn lowercase(c: char) -> BoxedShrinkable<char> {
        ShrinkableInteger::new(c as u32, 'a' as u32, ('a' as u32, 'z' as u32))
            .boxed()
            .map(|code| char::from_u32(code).unwrap())
    }

    fn string(text: &str, min_length: usize) -> BoxedShrinkable<String> {
        shrinkable_string(text.chars().map(lowercase).collect(), min_length)
    }

    fn candidates(shrinkable: &BoxedShrinkable<String>) -> Vec<String> {
        shrinkable.shrink().map(|c| c.value().clone()).collect()
    }

    #[test]
    fn test_string_distance() {
        let shrinkable = string("bcd", 0);
        assert_eq!(shrinkable.value(), "bcd");
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[3, 6]));
    }

    #[test]
    fn test_removals_come_first_most_distant_first() {
        let shrinkable = string("bdc", 0);
        let candidates = candidates(&shrinkable);
        assert_eq!(&candidates[..3], &["bc", "bd", "dc"]);
        // element shrinks follow in index order
        assert_eq!(candidates[3], "adc");
    }

    #[test]
    fn test_equal_distances_remove_later_position_first() {
        let shrinkable = string("bb", 0);
        let candidates = candidates(&shrinkable);
        assert_eq!(&candidates[..2], &["b", "b"]);
        let first_removal = shrinkable.shrink().next().unwrap();
        assert_eq!(first_removal.value(), "b");
    }

    #[test]
    fn test_min_size_is_never_crossed() {
        let shrinkable = string("ccc", 3);
        assert!(candidates(&shrinkable).iter().all(|c| c.chars().count() == 3));
    }

    #[test]
    fn test_candidates_are_strictly_simpler() {
        let shrinkable = string("hello", 1);
        let distance = shrinkable.distance();
        for candidate in shrinkable.shrink() {
            assert!(candidate.distance() < distance);
            assert!(!candidate.value().is_empty());
        }
    }

    #[test]
    fn test_vec_generation_respects_sizes() {
        let arbitrary = vecs(integers::<u8>()).of_min_size(2).of_max_size(4);
        let generator = arbitrary.generator(1000);
        let mut random = RandomSource::from_u64(12);
        for _ in 0..100 {
            let len = generator.next(&mut random).unwrap().value().len();
            assert!((2..=4).contains(&len));
        }
    }

    #[test]
    fn test_gen_size_limits_length() {
        let generator = strings().of_min_length(1).generator(3);
        let mut random = RandomSource::from_u64(4);
        for _ in 0..100 {
            let len = generator.next(&mut random).unwrap().value().chars().count();
            assert!((1..=4).contains(&len));
        }
    }

    #[test]
    fn test_strings_with_chars() {
        let arbitrary = strings()
            .with_chars(chars().range('x', 'z'))
            .of_length(5);
        let mut random = RandomSource::from_u64(21);
        let value = arbitrary.sample(&mut random).unwrap();
        assert_eq!(value.len(), 5);
        assert!(value.chars().all(|c| ('x'..='z').contains(&c)));
    }

    #[test]
    fn test_exhaustive_shortlex_order() {
        let arbitrary = strings()
            .with_chars(chars().range('a', 'b'))
            .of_max_length(2);
        let exhaustive = arbitrary.exhaustive(100).unwrap();
        assert_eq!(exhaustive.count(), Some(7));
        let values: Vec<String> = exhaustive.iter().collect();
        assert_eq!(values, vec!["", "a", "b", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn test_exhaustive_unavailable_when_too_large() {
        let arbitrary = vecs(integers::<u8>()).of_max_size(3);
        assert!(arbitrary.exhaustive(1000).is_none());
        assert!(vecs(integers::<u64>()).exhaustive(u64::MAX).is_none());
    }

    #[test]
    fn test_container_edge_cases() {
        let arbitrary = vecs(integers::<i32>().between(-5, 5)).of_max_size(3);
        let edges = arbitrary.edge_cases(4).values();
        assert_eq!(edges, vec![vec![], vec![0], vec![-5], vec![-4]]);

        let sized = vecs(integers::<i32>().between(-5, 5)).of_size(3);
        assert_eq!(sized.edge_cases(10).values(), vec![vec![0, 0, 0]]);
    }
}
