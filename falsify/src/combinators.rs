//! Combinators: build arbitraries of composite values from independent components.
//!
//! A combined value shrinks one component at a time (component 0's candidates first), its
//! exhaustive enumeration is the cartesian product of the components' enumerations, and its
//! edge cases are slices through the components' edge cases.

use std::rc::Rc;
use std::sync::Arc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::exhaustive::{ExhaustiveGenerator, product};
use crate::generator::{BoxedGenerator, Generated};
use crate::random::RandomSource;
use crate::shrinkable::{BoxedShrinkable, ShrinkCandidates, Shrinkable};

/// Index tuples selecting edge cases from components with `counts` edge cases each.
///
/// The base combination (every component at index 0) comes first. Then each component in
/// turn, round-robin, moves through its remaining edge cases while the others stay at the
/// base. At most `max` tuples are returned; none if any component has no edge cases.
pub fn edge_case_slices(counts: &[usize], max: usize) -> Vec<Vec<usize>> {
    if max == 0 || counts.contains(&0) {
        return Vec::new();
    }
    let base = vec![0; counts.len()];
    let mut slices = vec![base.clone()];
    let mut cursors = vec![1; counts.len()];
    'rounds: loop {
        let mut progressed = false;
        for (component, &count) in counts.iter().enumerate() {
            if cursors[component] >= count {
                continue;
            }
            if slices.len() >= max {
                break 'rounds;
            }
            let mut slice = base.clone();
            slice[component] = cursors[component];
            slices.push(slice);
            cursors[component] += 1;
            progressed = true;
        }
        if !progressed {
            break;
        }
    }
    slices.truncate(max);
    slices
}

type Combinator<V, R> = Rc<dyn Fn(&[V]) -> R>;

/// Shrinkable value computed from independently shrinkable parts
struct CombinedShrinkable<V, R> {
    parts: Vec<BoxedShrinkable<V>>,
    combinator: Combinator<V, R>,
    value: R,
}

impl<V: Clone + 'static, R: Clone + 'static> CombinedShrinkable<V, R> {
    fn new(parts: Vec<BoxedShrinkable<V>>, combinator: Combinator<V, R>) -> Self {
        let values: Vec<V> = parts.iter().map(|part| part.value().clone()).collect();
        let value = combinator(&values);
        Self {
            parts,
            combinator,
            value,
        }
    }
}

impl<V: Clone + 'static, R: Clone + 'static> Shrinkable<R> for CombinedShrinkable<V, R> {
    fn value(&self) -> &R {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        ShrinkingDistance::combine(&self.parts)
    }

    fn shrink(&self) -> ShrinkCandidates<R> {
        let parts = Rc::new(self.parts.clone());
        let combinator = Rc::clone(&self.combinator);
        Box::new((0..parts.len()).flat_map(move |index| {
            let parts = Rc::clone(&parts);
            let combinator = Rc::clone(&combinator);
            let candidates = parts[index].shrink();
            candidates.map(move |candidate| {
                let mut replaced = parts.as_ref().clone();
                replaced[index] = candidate;
                CombinedShrinkable::new(replaced, Rc::clone(&combinator)).boxed()
            })
        }))
    }
}

/// Combine shrinkable parts into one shrinkable whose value is `combinator(values)`
pub fn combine_shrinkables<V, R, F>(parts: Vec<BoxedShrinkable<V>>, combinator: F) -> BoxedShrinkable<R>
where
    V: Clone + 'static,
    R: Clone + 'static,
    F: Fn(&[V]) -> R + 'static,
{
    CombinedShrinkable::new(parts, Rc::new(combinator)).boxed()
}

/// Exhaustive enumeration of `combinator` over the components' cartesian product.
///
/// `None` if any component is not exhaustively enumerable or the product exceeds
/// `max_samples`.
pub fn combine_exhaustive<V, R, F>(
    arbitraries: &[BoxedArbitrary<V>],
    combinator: F,
    max_samples: u64,
) -> Option<ExhaustiveGenerator<R>>
where
    V: Clone + 'static,
    R: Clone + 'static,
    F: Fn(&[V]) -> R + 'static,
{
    let components = arbitraries
        .iter()
        .map(|arbitrary| arbitrary.exhaustive(max_samples))
        .collect::<Option<Vec<_>>>()?;
    Some(product(components, max_samples)?.map(move |values| combinator(&values)))
}

/// Edge cases of `combinator` built from slices through the components' edge cases
pub fn combine_edge_cases<V, R, F>(
    arbitraries: &[BoxedArbitrary<V>],
    combinator: F,
    max_edge_cases: usize,
) -> EdgeCases<R>
where
    V: Clone + 'static,
    R: Clone + 'static,
    F: Fn(&[V]) -> R + 'static,
{
    let components: Vec<EdgeCases<V>> = arbitraries
        .iter()
        .map(|arbitrary| arbitrary.edge_cases(max_edge_cases))
        .collect();
    let counts: Vec<usize> = components.iter().map(|edges| edges.len()).collect();
    let combinator: Combinator<V, R> = Rc::new(combinator);
    let cases = edge_case_slices(&counts, max_edge_cases)
        .into_iter()
        .map(|slice| {
            let parts = slice
                .iter()
                .zip(&components)
                .filter_map(|(&index, edges)| edges.get(index).cloned())
                .collect();
            CombinedShrinkable::new(parts, Rc::clone(&combinator)).boxed()
        })
        .collect();
    EdgeCases::from_shrinkables(cases)
}

/// Arbitrary produced by [`combine`]
pub struct Combined<V: Clone + 'static, R> {
    arbitraries: Vec<BoxedArbitrary<V>>,
    combinator: Arc<dyn Fn(&[V]) -> R + Send + Sync>,
}

/// Combine values of several arbitraries of the same type with `combinator`
pub fn combine<V, R, F>(arbitraries: Vec<BoxedArbitrary<V>>, combinator: F) -> Combined<V, R>
where
    V: Clone + 'static,
    R: Clone + 'static,
    F: Fn(&[V]) -> R + Send + Sync + 'static,
{
    Combined {
        arbitraries,
        combinator: Arc::new(combinator),
    }
}

impl<V: Clone + 'static, R: Clone + 'static> Combined<V, R> {
    fn local_combinator(&self) -> impl Fn(&[V]) -> R + Clone + 'static + use<V, R> {
        let combinator = Arc::clone(&self.combinator);
        move |values: &[V]| combinator(values)
    }
}

impl<V: Clone + 'static, R: Clone + 'static> Arbitrary<R> for Combined<V, R> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<R> {
        let generators: Vec<BoxedGenerator<V>> = self
            .arbitraries
            .iter()
            .map(|arbitrary| arbitrary.generator(gen_size))
            .collect();
        let combinator = self.local_combinator();
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<R> {
            let parts = generators
                .iter()
                .map(|generator| generator.next(random))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(combine_shrinkables(parts, combinator.clone()))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<R>> {
        combine_exhaustive(&self.arbitraries, self.local_combinator(), max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<R> {
        combine_edge_cases(&self.arbitraries, self.local_combinator(), max_edge_cases)
    }
}

/// A pair of independently shrinkable values
struct ZipShrinkable<A, B> {
    left: BoxedShrinkable<A>,
    right: BoxedShrinkable<B>,
    value: (A, B),
}

impl<A: Clone + 'static, B: Clone + 'static> ZipShrinkable<A, B> {
    fn new(left: BoxedShrinkable<A>, right: BoxedShrinkable<B>) -> Self {
        let value = (left.value().clone(), right.value().clone());
        Self { left, right, value }
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Shrinkable<(A, B)> for ZipShrinkable<A, B> {
    fn value(&self) -> &(A, B) {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        self.left.distance().append(&self.right.distance())
    }

    fn shrink(&self) -> ShrinkCandidates<(A, B)> {
        let right = self.right.clone();
        let left = self.left.clone();
        let left_shrinks = self
            .left
            .shrink()
            .map(move |candidate| ZipShrinkable::new(candidate, right.clone()).boxed());
        let right_shrinks = self
            .right
            .shrink()
            .map(move |candidate| ZipShrinkable::new(left.clone(), candidate).boxed());
        Box::new(left_shrinks.chain(right_shrinks))
    }
}

/// Pair two shrinkables; the left one is shrunk first
pub fn zip_shrinkables<A, B>(left: BoxedShrinkable<A>, right: BoxedShrinkable<B>) -> BoxedShrinkable<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    ZipShrinkable::new(left, right).boxed()
}

/// Arbitrary produced by [`zip`]
pub struct Zip<A: Clone + 'static, B: Clone + 'static> {
    left: BoxedArbitrary<A>,
    right: BoxedArbitrary<B>,
}

/// Pairs of values from two arbitraries of possibly different types
pub fn zip<A, B>(left: impl Arbitrary<A> + 'static, right: impl Arbitrary<B> + 'static) -> Zip<A, B>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    Zip {
        left: left.boxed(),
        right: right.boxed(),
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Arbitrary<(A, B)> for Zip<A, B> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<(A, B)> {
        let left = self.left.generator(gen_size);
        let right = self.right.generator(gen_size);
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<(A, B)> {
            let left = left.next(random)?;
            let right = right.next(random)?;
            Ok(zip_shrinkables(left, right))
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<(A, B)>> {
        let left = self.left.exhaustive(max_samples)?;
        let right = self.right.exhaustive(max_samples)?;
        let count = left.max_count().checked_mul(right.max_count())?;
        let exact = left.count().is_some() && right.count().is_some();
        let pairs = ExhaustiveGenerator::new(count, move || {
            let right = right.clone();
            left.iter().flat_map(move |a| right.iter().map(move |b| (a.clone(), b)))
        })
        .within(max_samples)?;
        Some(if exact { pairs } else { pairs.as_upper_bound() })
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<(A, B)> {
        let left = self.left.edge_cases(max_edge_cases);
        let right = self.right.edge_cases(max_edge_cases);
        let cases = edge_case_slices(&[left.len(), right.len()], max_edge_cases)
            .into_iter()
            .filter_map(|slice| {
                let a = left.get(slice[0])?.clone();
                let b = right.get(slice[1])?.clone();
                Some(zip_shrinkables(a, b))
            })
            .collect();
        EdgeCases::from_shrinkables(cases)
    }
}

/// Combine two arbitraries of different types
pub fn combine2<A, B, R, F>(
    a: impl Arbitrary<A> + 'static,
    b: impl Arbitrary<B> + 'static,
    combinator: F,
) -> BoxedArbitrary<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    R: Clone + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    zip(a, b).map(move |(a, b)| combinator(a, b)).boxed()
}

/// Combine three arbitraries of different types
pub fn combine3<A, B, C, R, F>(
    a: impl Arbitrary<A> + 'static,
    b: impl Arbitrary<B> + 'static,
    c: impl Arbitrary<C> + 'static,
    combinator: F,
) -> BoxedArbitrary<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    R: Clone + 'static,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    zip(zip(a, b), c)
        .map(move |((a, b), c)| combinator(a, b, c))
        .boxed()
}

/// Combine four arbitraries of different types
pub fn combine4<A, B, C, D, R, F>(
    a: impl Arbitrary<A> + 'static,
    b: impl Arbitrary<B> + 'static,
    c: impl Arbitrary<C> + 'static,
    d: impl Arbitrary<D> + 'static,
    combinator: F,
) -> BoxedArbitrary<R>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    D: Clone + 'static,
    R: Clone + 'static,
    F: Fn(A, B, C, D) -> R + Send + Sync + 'static,
{
    zip(zip(a, b), zip(c, d))
        .map(move |((a, b), (c, d))| combinator(a, b, c, d))
        .boxed()
}
