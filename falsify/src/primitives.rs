//! Arbitraries and shrinkables for primitive types.

use std::fmt;
use std::iter;
use std::sync::Arc;

use num_traits::{Float, PrimInt};
use rand::Rng;

use crate::arbitrary::Arbitrary;
use crate::distance::ShrinkingDistance;
use crate::edge_cases::EdgeCases;
use crate::error::GenerationError;
use crate::exhaustive::ExhaustiveGenerator;
use crate::generator::{BoxedGenerator, Generated};
use crate::random::RandomSource;
use crate::shrinkable::{ShrinkCandidates, Shrinkable, Unshrinkable};

/// Primitive integer types supported by [`integers`].
///
/// All arithmetic happens in `i128`, which holds every value of the supported types.
pub trait Integral: PrimInt + fmt::Debug + Send + Sync + 'static {
    fn to_wide(self) -> i128;
    fn from_wide(wide: i128) -> Self;
}

macro_rules! impl_integral {
    ($($t:ty),*) => {
        $(
            impl Integral for $t {
                fn to_wide(self) -> i128 {
                    self as i128
                }

                fn from_wide(wide: i128) -> Self {
                    wide as $t
                }
            }
        )*
    };
}

impl_integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Primitive floating point types supported by [`doubles`] and [`floats`]
pub trait Floating: Float + fmt::Debug + Send + Sync + 'static {
    fn to_wide(self) -> f64;
    fn from_wide(wide: f64) -> Self;
}

macro_rules! impl_floating {
    ($($t:ty),*) => {
        $(
            impl Floating for $t {
                fn to_wide(self) -> f64 {
                    self as f64
                }

                fn from_wide(wide: f64) -> Self {
                    wide as $t
                }
            }
        )*
    };
}

impl_floating!(f32, f64);

fn clamp_wide(value: i128, min: i128, max: i128) -> i128 {
    value.max(min).min(max)
}

/// An integer that shrinks toward a target inside its range
#[derive(Debug, Clone)]
pub struct ShrinkableInteger<N> {
    value: N,
    target: N,
}

impl<N: Integral> ShrinkableInteger<N> {
    /// `target` is clamped into `range` before use
    pub fn new(value: N, target: N, range: (N, N)) -> Self {
        let (min, max) = (range.0.to_wide(), range.1.to_wide());
        let target = N::from_wide(clamp_wide(target.to_wide(), min.min(max), max.max(min)));
        Self { value, target }
    }
}

impl<N: Integral> Shrinkable<N> for ShrinkableInteger<N> {
    fn value(&self) -> &N {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        let gap = (self.value.to_wide() - self.target.to_wide()).unsigned_abs();
        ShrinkingDistance::of(&[u64::try_from(gap).unwrap_or(u64::MAX)])
    }

    fn shrink(&self) -> ShrinkCandidates<N> {
        let value = self.value.to_wide();
        let target = self.target;
        if value == target.to_wide() {
            return Box::new(iter::empty());
        }
        // the target first, then halve the remaining gap toward the value
        let steps = iter::successors(Some(target.to_wide()), move |&low| {
            let step = (value - low) / 2;
            (step != 0).then_some(low + step)
        });
        Box::new(steps.map(move |candidate| {
            ShrinkableInteger {
                value: N::from_wide(candidate),
                target,
            }
            .boxed()
        }))
    }
}

/// Integers within an inclusive range
#[derive(Debug, Clone)]
pub struct IntegralArbitrary<N> {
    min: N,
    max: N,
    target: Option<N>,
}

/// All values of the integer type `N`, shrinking toward zero
pub fn integers<N: Integral>() -> IntegralArbitrary<N> {
    IntegralArbitrary {
        min: N::min_value(),
        max: N::max_value(),
        target: None,
    }
}

impl<N: Integral> IntegralArbitrary<N> {
    /// Restrict to `[min, max]`; swapped bounds are reordered
    pub fn between(mut self, min: N, max: N) -> Self {
        if min <= max {
            self.min = min;
            self.max = max;
        } else {
            self.min = max;
            self.max = min;
        }
        self
    }

    pub fn greater_or_equal(self, min: N) -> Self {
        let max = self.max.max(min);
        self.between(min, max)
    }

    pub fn less_or_equal(self, max: N) -> Self {
        let min = self.min.min(max);
        self.between(min, max)
    }

    /// Shrink toward `target` instead of zero
    pub fn shrink_towards(mut self, target: N) -> Self {
        self.target = Some(target);
        self
    }

    fn shrink_target(&self) -> N {
        let target = self.target.unwrap_or_else(N::zero);
        N::from_wide(clamp_wide(
            target.to_wide(),
            self.min.to_wide(),
            self.max.to_wide(),
        ))
    }

    fn shrinkable(&self, value: N) -> ShrinkableInteger<N> {
        ShrinkableInteger {
            value,
            target: self.shrink_target(),
        }
    }
}

impl<N: Integral> Arbitrary<N> for IntegralArbitrary<N> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<N> {
        let this = self.clone();
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        let target = self.shrink_target().to_wide();
        let window = gen_size as i128;
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<N> {
            // half of the draws stay within gen_size of the target
            let value = if window > 0 && random.gen_bool(0.5) {
                let low = clamp_wide(target - window, min, max);
                let high = clamp_wide(target + window, min, max);
                random.gen_range(low..=high)
            } else {
                random.gen_range(min..=max)
            };
            Ok(this.shrinkable(N::from_wide(value)).boxed())
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<N>> {
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        let count = u64::try_from(max - min + 1).ok()?;
        ExhaustiveGenerator::new(count, move || (min..=max).map(N::from_wide)).within(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<N> {
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        let target = self.shrink_target().to_wide();
        let mut values: Vec<i128> = Vec::new();
        for candidate in [target, min, min + 1, max - 1, max, -1, 1] {
            if (min..=max).contains(&candidate) && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        EdgeCases::from_shrinkables(
            values
                .into_iter()
                .map(|value| self.shrinkable(N::from_wide(value)).boxed())
                .collect(),
        )
        .limit(max_edge_cases)
    }
}

/// A floating point number that shrinks toward a target.
///
/// Distance is `[magnitude, floor(|value - target|), has_fraction]`, so whole numbers are
/// simpler than their fractional neighbours. `magnitude` is zero unless the gap is too wide
/// for `u64`; then it holds the gap's bit pattern, which orders positive floats.
#[derive(Debug, Clone)]
pub struct ShrinkableFloat<F> {
    value: F,
    target: F,
}

/// 2^64, the first gap that no longer fits into a `u64` dimension
const WIDE_GAP: f64 = 18_446_744_073_709_551_616.0;

impl<F: Floating> ShrinkableFloat<F> {
    pub fn new(value: F, target: F) -> Self {
        Self { value, target }
    }

    fn gap(&self) -> f64 {
        (self.value.to_wide() - self.target.to_wide()).abs()
    }
}

impl<F: Floating> Shrinkable<F> for ShrinkableFloat<F> {
    fn value(&self) -> &F {
        &self.value
    }

    fn distance(&self) -> ShrinkingDistance {
        let gap = self.gap();
        if !gap.is_finite() {
            return ShrinkingDistance::of(&[u64::MAX, u64::MAX, 1]);
        }
        let magnitude = if gap >= WIDE_GAP { gap.to_bits() } else { 0 };
        let fraction = u64::from(gap.fract() != 0.0);
        // `as` saturates for wide gaps, which `magnitude` already orders
        ShrinkingDistance::of(&[magnitude, gap.floor() as u64, fraction])
    }

    fn shrink(&self) -> ShrinkCandidates<F> {
        let parent = self.distance();
        if parent.is_zero() {
            return Box::new(iter::empty());
        }
        let target = self.target;
        let wide_target = target.to_wide();
        let difference = self.value.to_wide() - wide_target;
        let gap = self.gap();

        let mut offsets = vec![0.0];
        if gap.is_finite() {
            let whole = gap.floor();
            if gap.fract() != 0.0 && whole > 0.0 {
                offsets.push(whole);
            }
            // halve the remaining whole gap until the step vanishes or falls below precision
            let halvings = iter::successors(Some(0.0f64), move |&low| {
                let step = ((whole - low) / 2.0).floor();
                let next = low + step;
                (step >= 1.0 && next > low).then_some(next)
            });
            offsets.extend(halvings.skip(1));
        }
        let sign = difference.signum();

        Box::new(
            offsets
                .into_iter()
                .map(move |offset| ShrinkableFloat {
                    value: F::from_wide(wide_target + sign * offset),
                    target,
                })
                .filter(move |candidate| candidate.distance() < parent)
                .map(|candidate| candidate.boxed()),
        )
    }
}

/// Floating point numbers within an inclusive, finite range
#[derive(Debug, Clone)]
pub struct FloatArbitrary<F> {
    min: F,
    max: F,
    target: Option<F>,
}

/// Finite `f64` values, shrinking toward zero
pub fn doubles() -> FloatArbitrary<f64> {
    FloatArbitrary {
        min: f64::MIN,
        max: f64::MAX,
        target: None,
    }
}

/// Finite `f32` values, shrinking toward zero
pub fn floats() -> FloatArbitrary<f32> {
    FloatArbitrary {
        min: f32::MIN,
        max: f32::MAX,
        target: None,
    }
}

impl<F: Floating> FloatArbitrary<F> {
    /// Restrict to `[min, max]`; swapped bounds are reordered
    pub fn between(mut self, min: F, max: F) -> Self {
        if min <= max {
            self.min = min;
            self.max = max;
        } else {
            self.min = max;
            self.max = min;
        }
        self
    }

    pub fn shrink_towards(mut self, target: F) -> Self {
        self.target = Some(target);
        self
    }

    fn shrink_target(&self) -> F {
        self.target
            .unwrap_or_else(F::zero)
            .max(self.min)
            .min(self.max)
    }
}

fn interpolate(low: f64, high: f64, fraction: f64) -> f64 {
    // stays finite even when high - low overflows
    (low * (1.0 - fraction) + high * fraction).clamp(low, high)
}

impl<F: Floating> Arbitrary<F> for FloatArbitrary<F> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<F> {
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        let target = self.shrink_target();
        let wide_target = target.to_wide();
        let window = gen_size as f64;
        BoxedGenerator::new(move |random: &mut RandomSource| -> Generated<F> {
            let (low, high) = if window > 0.0 && random.gen_bool(0.5) {
                (
                    (wide_target - window).max(min),
                    (wide_target + window).min(max),
                )
            } else {
                (min, max)
            };
            let value = interpolate(low, high, random.r#gen::<f64>());
            Ok(ShrinkableFloat::new(F::from_wide(value), target).boxed())
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<F>> {
        // only a degenerate range is enumerable
        (self.min == self.max && max_samples >= 1)
            .then(|| ExhaustiveGenerator::from_values(vec![self.min]))
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<F> {
        let target = self.shrink_target();
        let mut values: Vec<F> = Vec::new();
        for candidate in [target, self.min, self.max, F::one(), -F::one()] {
            let in_range = candidate >= self.min && candidate <= self.max;
            if in_range && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        EdgeCases::from_shrinkables(
            values
                .into_iter()
                .map(|value| ShrinkableFloat::new(value, target).boxed())
                .collect(),
        )
        .limit(max_edge_cases)
    }
}

const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// Ordered set of character ranges with surrogates removed
#[derive(Debug)]
struct CharTable {
    ranges: Vec<(u32, u32)>,
}

impl CharTable {
    fn new(ranges: &[(char, char)]) -> Self {
        let mut table = Vec::new();
        for &(first, last) in ranges {
            let (low, high) = if first <= last {
                (first as u32, last as u32)
            } else {
                (last as u32, first as u32)
            };
            // chars never fall inside the surrogate block, but a range may span it
            if low < SURROGATES.0 && high > SURROGATES.1 {
                table.push((low, SURROGATES.0 - 1));
                table.push((SURROGATES.1 + 1, high));
            } else {
                table.push((low, high));
            }
        }
        Self { ranges: table }
    }

    fn size(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(low, high)| u64::from(high - low) + 1)
            .sum()
    }

    fn char_at(&self, mut index: u64) -> char {
        for &(low, high) in &self.ranges {
            let width = u64::from(high - low) + 1;
            if index < width {
                return char::from_u32(low + index as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
            }
            index -= width;
        }
        char::REPLACEMENT_CHARACTER
    }

    fn index_of(&self, c: char) -> Option<u64> {
        let code = c as u32;
        let mut offset = 0;
        for &(low, high) in &self.ranges {
            if (low..=high).contains(&code) {
                return Some(offset + u64::from(code - low));
            }
            offset += u64::from(high - low) + 1;
        }
        None
    }
}

/// Characters from one or more ranges
#[derive(Debug, Clone)]
pub struct CharArbitrary {
    table: Arc<CharTable>,
    target: Option<char>,
}

/// Every unicode scalar value, shrinking toward `'a'`
pub fn chars() -> CharArbitrary {
    CharArbitrary::with_ranges(&[('\u{0}', char::MAX)])
}

impl CharArbitrary {
    fn with_ranges(ranges: &[(char, char)]) -> Self {
        Self {
            table: Arc::new(CharTable::new(ranges)),
            target: None,
        }
    }

    /// Characters from `min` to `max` inclusive
    pub fn range(self, min: char, max: char) -> Self {
        Self::with_ranges(&[(min, max)]).keep_target(self.target)
    }

    /// Characters in `0x00..=0x7F`
    pub fn ascii(self) -> Self {
        self.range('\u{0}', '\u{7f}')
    }

    /// `a-z` and `A-Z`
    pub fn alpha(self) -> Self {
        Self::with_ranges(&[('a', 'z'), ('A', 'Z')]).keep_target(self.target)
    }

    /// `0-9`
    pub fn numeric(self) -> Self {
        self.range('0', '9')
    }

    /// Shrink toward `target`; ignored when it is outside the ranges
    pub fn shrink_towards(mut self, target: char) -> Self {
        self.target = Some(target);
        self
    }

    fn keep_target(mut self, target: Option<char>) -> Self {
        self.target = target;
        self
    }

    fn indices(&self) -> Result<IntegralArbitrary<u64>, GenerationError> {
        let size = self.table.size();
        if size == 0 {
            return Err(GenerationError::EmptyDomain { domain: "chars" });
        }
        let target = self
            .target
            .and_then(|c| self.table.index_of(c))
            .or_else(|| self.table.index_of('a'))
            .unwrap_or(0);
        Ok(integers::<u64>().between(0, size - 1).shrink_towards(target))
    }

    fn chars_of(
        &self,
        indices: IntegralArbitrary<u64>,
    ) -> impl Arbitrary<char> + use<> {
        let table = Arc::clone(&self.table);
        indices.map(move |index| table.char_at(index))
    }
}

impl Arbitrary<char> for CharArbitrary {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<char> {
        match self.indices() {
            Ok(indices) => self.chars_of(indices).generator(gen_size),
            Err(error) => BoxedGenerator::new(move |_: &mut RandomSource| -> Generated<char> {
                Err(error.clone())
            }),
        }
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<char>> {
        let indices = self.indices().ok()?;
        self.chars_of(indices).exhaustive(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<char> {
        match self.indices() {
            Ok(indices) => self.chars_of(indices).edge_cases(max_edge_cases),
            Err(_) => EdgeCases::none(),
        }
    }
}

/// Exactly one value
#[derive(Debug, Clone)]
pub struct Just<T> {
    value: T,
}

pub fn just<T: Clone + Send + Sync + 'static>(value: T) -> Just<T> {
    Just { value }
}

impl<T: Clone + Send + Sync + 'static> Arbitrary<T> for Just<T> {
    fn generator(&self, _gen_size: usize) -> BoxedGenerator<T> {
        let value = self.value.clone();
        BoxedGenerator::new(move |_: &mut RandomSource| -> Generated<T> {
            Ok(Unshrinkable::new(value.clone()).boxed())
        })
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::from_values(vec![self.value.clone()]).within(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        EdgeCases::from_values(vec![self.value.clone()]).limit(max_edge_cases)
    }
}

/// One of a fixed list of values; shrinks toward earlier values
#[derive(Debug, Clone)]
pub struct OneOf<T> {
    values: Arc<Vec<T>>,
}

pub fn of<T: Clone + Send + Sync + 'static>(values: Vec<T>) -> OneOf<T> {
    OneOf {
        values: Arc::new(values),
    }
}

/// `false` and `true`, shrinking toward `false`
pub fn booleans() -> OneOf<bool> {
    of(vec![false, true])
}

impl<T: Clone + Send + Sync + 'static> OneOf<T> {
    fn choices(&self) -> Option<impl Arbitrary<T> + use<T>> {
        let last = self.values.len().checked_sub(1)?;
        let values = Arc::clone(&self.values);
        Some(
            integers::<usize>()
                .between(0, last)
                .map(move |index| values[index].clone()),
        )
    }
}

impl<T: Clone + Send + Sync + 'static> Arbitrary<T> for OneOf<T> {
    fn generator(&self, gen_size: usize) -> BoxedGenerator<T> {
        match self.choices() {
            Some(choices) => choices.generator(gen_size),
            None => BoxedGenerator::new(|_: &mut RandomSource| -> Generated<T> {
                Err(GenerationError::EmptyDomain { domain: "of" })
            }),
        }
    }

    fn exhaustive(&self, max_samples: u64) -> Option<ExhaustiveGenerator<T>> {
        ExhaustiveGenerator::from_values(self.values.as_ref().clone()).within(max_samples)
    }

    fn edge_cases(&self, max_edge_cases: usize) -> EdgeCases<T> {
        let Some(last) = self.values.len().checked_sub(1) else {
            return EdgeCases::none();
        };
        let mut indices = vec![0];
        if last > 0 {
            indices.push(last);
        }
        // same index shrinkables as generated samples, so edge cases shrink toward earlier values
        let edges = indices
            .into_iter()
            .map(|index| {
                let values = Arc::clone(&self.values);
                ShrinkableInteger::new(index, 0, (0, last))
                    .boxed()
                    .map(move |index| values[index].clone())
            })
            .collect();
        EdgeCases::from_shrinkables(edges).limit(max_edge_cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::BoxedShrinkable;
    use crate::shrinking::{FalsificationResult, shrink_to_end};

    fn values<T: Clone + 'static>(shrinkable: &BoxedShrinkable<T>) -> Vec<T> {
        shrinkable.shrink().map(|c| c.value().clone()).collect()
    }

    #[test]
    fn test_integer_shrink_candidates() {
        let ten = ShrinkableInteger::new(10i32, 0, (i32::MIN, i32::MAX)).boxed();
        assert_eq!(values(&ten), vec![0, 5, 7, 8, 9]);
        assert_eq!(ten.distance(), ShrinkingDistance::of(&[10]));

        let negative = ShrinkableInteger::new(-5i64, 0, (-10, 10)).boxed();
        assert_eq!(values(&negative), vec![0, -2, -3, -4]);

        let at_target = ShrinkableInteger::new(0u8, 0, (0, 255)).boxed();
        assert!(values(&at_target).is_empty());
    }

    #[test]
    fn test_integer_target_is_clamped_into_range() {
        let shrinkable = ShrinkableInteger::new(12u32, 0, (10, 20)).boxed();
        assert_eq!(values(&shrinkable)[0], 10);
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[2]));
    }

    #[test]
    fn test_integer_candidates_are_strictly_closer() {
        let shrinkable = ShrinkableInteger::new(i64::MAX, 0, (i64::MIN, i64::MAX)).boxed();
        let distance = shrinkable.distance();
        assert!(shrinkable.shrink().all(|c| c.distance() < distance));
        let extreme = ShrinkableInteger::new(i64::MIN, 0, (i64::MIN, i64::MAX)).boxed();
        assert_eq!(extreme.distance(), ShrinkingDistance::of(&[1u64 << 63]));
    }

    #[test]
    fn test_integers_stay_in_range() {
        let generator = integers::<i16>().between(-50, 50).generator(10);
        let mut random = RandomSource::from_u64(99);
        for _ in 0..200 {
            let value = *generator.next(&mut random).unwrap().value();
            assert!((-50..=50).contains(&value));
        }
    }

    #[test]
    fn test_integer_edge_cases() {
        let edges = integers::<i32>().between(-10, 10).edge_cases(20).values();
        assert_eq!(edges, vec![0, -10, -9, 9, 10, -1, 1]);

        let unsigned = integers::<u8>().edge_cases(20).values();
        assert_eq!(unsigned, vec![0, 1, 254, 255]);

        let shifted = integers::<i32>().between(5, 7).edge_cases(3).values();
        assert_eq!(shifted, vec![5, 6, 7]);
    }

    #[test]
    fn test_integer_exhaustive() {
        let arbitrary = integers::<i8>().between(-2, 2);
        let exhaustive = arbitrary.exhaustive(5).unwrap();
        assert_eq!(exhaustive.count(), Some(5));
        assert_eq!(exhaustive.iter().collect::<Vec<_>>(), vec![-2, -1, 0, 1, 2]);
        assert!(arbitrary.exhaustive(4).is_none());
        assert!(integers::<u64>().exhaustive(u64::MAX).is_none());
    }

    #[test]
    fn test_shrink_towards() {
        let arbitrary = integers::<i32>().between(0, 100).shrink_towards(42);
        let mut random = RandomSource::from_u64(5);
        let shrinkable = arbitrary.generator(100).next(&mut random).unwrap();
        if *shrinkable.value() != 42 {
            assert_eq!(*shrinkable.shrink().next().unwrap().value(), 42);
        }
        assert_eq!(arbitrary.edge_cases(1).values(), vec![42]);
    }

    #[test]
    fn test_float_distance_and_candidates() {
        let shrinkable = ShrinkableFloat::new(10.5f64, 0.0).boxed();
        assert_eq!(shrinkable.distance(), ShrinkingDistance::of(&[0, 10, 1]));
        assert_eq!(values(&shrinkable), vec![0.0, 10.0, 5.0, 7.0, 8.0, 9.0]);

        let negative = ShrinkableFloat::new(-0.25f32, 0.0).boxed();
        assert_eq!(values(&negative), vec![0.0]);

        let whole = ShrinkableFloat::new(3.0f64, 1.0).boxed();
        assert_eq!(values(&whole), vec![1.0, 2.0]);
    }

    #[test]
    fn test_float_candidates_are_strictly_closer() {
        let huge = ShrinkableFloat::new(1.0e300f64, 0.0).boxed();
        let distance = huge.distance();
        assert!(huge.shrink().all(|c| c.distance() < distance));
        assert_eq!(*huge.shrink().next().unwrap().value(), 0.0);
        assert!(huge.shrink().count() > 1);
    }

    #[test]
    fn test_wide_floats_shrink_toward_the_boundary() {
        let falsifier = |x: &f64| *x < 1.0e20;
        let start = FalsificationResult::new(ShrinkableFloat::new(1.0e300f64, 0.0).boxed(), None);
        let result = shrink_to_end(start, &falsifier, None, |_| {});
        assert!(result.shrink_steps > 0);
        assert!(result.minimal >= 1.0e20 && result.minimal < 2.0e20, "{}", result.minimal);

        let wider = ShrinkableFloat::new(1.0e300f64, 0.0).boxed();
        let narrower = ShrinkableFloat::new(1.0e299f64, 0.0).boxed();
        assert!(narrower.distance() < wider.distance());
    }

    #[test]
    fn test_doubles_in_range() {
        let generator = doubles().between(-1.5, 2.5).generator(1000);
        let mut random = RandomSource::from_u64(17);
        for _ in 0..200 {
            let value = *generator.next(&mut random).unwrap().value();
            assert!((-1.5..=2.5).contains(&value));
        }
        let edges = doubles().between(0.5, 10.0).edge_cases(10).values();
        assert_eq!(edges, vec![0.5, 10.0, 1.0]);
    }

    #[test]
    fn test_unbounded_floats_are_finite() {
        let generator = floats().generator(1000);
        let mut random = RandomSource::from_u64(8);
        for _ in 0..200 {
            assert!(generator.next(&mut random).unwrap().value().is_finite());
        }
    }

    #[test]
    fn test_chars_skip_surrogates() {
        let arbitrary = chars().range('\u{D700}', '\u{E0FF}');
        let exhaustive = arbitrary.exhaustive(1_000).unwrap();
        assert_eq!(exhaustive.count(), Some(0x100 + 0x100));
        assert!(exhaustive.iter().all(|c| !(0xD800..=0xDFFF).contains(&(c as u32))));
    }

    #[test]
    fn test_char_ranges_and_shrinking() {
        let lower = chars().range('a', 'z');
        let mut random = RandomSource::from_u64(3);
        let shrinkable = lower.generator(100).next(&mut random).unwrap();
        assert!(shrinkable.value().is_ascii_lowercase());
        if *shrinkable.value() != 'a' {
            assert_eq!(*shrinkable.shrink().next().unwrap().value(), 'a');
        }

        let alpha: String = chars().alpha().exhaustive(100).unwrap().iter().collect();
        assert_eq!(alpha.len(), 52);
        assert!(alpha.starts_with("abc") && alpha.ends_with("XYZ"));

        let digits = chars().numeric().edge_cases(10).values();
        assert_eq!(digits, vec!['0', '1', '8', '9']);
    }

    #[test]
    fn test_booleans_and_of() {
        let exhaustive = booleans().exhaustive(2).unwrap();
        assert_eq!(exhaustive.iter().collect::<Vec<_>>(), vec![false, true]);

        let colors = of(vec!["red", "green", "blue"]);
        let mut random = RandomSource::from_u64(11);
        let shrinkable = colors.generator(10).next(&mut random).unwrap();
        if *shrinkable.value() != "red" {
            assert_eq!(*shrinkable.shrink().next().unwrap().value(), "red");
        }
        assert_eq!(colors.edge_cases(5).values(), vec!["red", "blue"]);
    }

    #[test]
    fn test_of_edge_cases_shrink_toward_earlier_values() {
        let colors = of(vec!["red", "green", "blue"]);
        let edges = colors.edge_cases(5);
        let blue = edges.get(1).unwrap();
        assert_eq!(values(blue), vec!["red", "green"]);
        assert!(values(edges.get(0).unwrap()).is_empty());

        let falsifier = |color: &&str| *color == "red";
        let start = FalsificationResult::new(blue.clone(), None);
        assert_eq!(shrink_to_end(start, &falsifier, None, |_| {}).minimal, "green");

        let flag = booleans().edge_cases(2);
        assert_eq!(values(flag.get(1).unwrap()), vec![false]);
    }

    #[test]
    fn test_empty_domains_report_errors() {
        let mut random = RandomSource::from_u64(0);
        assert_eq!(
            of(Vec::<u8>::new()).sample(&mut random),
            Err(GenerationError::EmptyDomain { domain: "of" })
        );
        assert!(of(Vec::<u8>::new()).edge_cases(5).is_empty());
    }

    #[test]
    fn test_just() {
        let arbitrary = just("fixed");
        let mut random = RandomSource::from_u64(0);
        let shrinkable = arbitrary.generator(10).next(&mut random).unwrap();
        assert_eq!(*shrinkable.value(), "fixed");
        assert_eq!(shrinkable.shrink().count(), 0);
        assert_eq!(arbitrary.exhaustive(1).unwrap().count(), Some(1));
    }
}
