//! Random generators: produce a fresh shrinkable for every draw.

use crate::error::GenerationError;
use crate::random::RandomSource;
use crate::shrinkable::BoxedShrinkable;

/// Result of a single draw
pub type Generated<T> = Result<BoxedShrinkable<T>, GenerationError>;

/// Core generator trait for creating random shrinkable values
pub trait RandomGenerator<T> {
    /// Draw the next value from the given random source
    fn next(&self, random: &mut RandomSource) -> Generated<T>;
}

impl<T, F> RandomGenerator<T> for F
where
    F: Fn(&mut RandomSource) -> Generated<T>,
{
    fn next(&self, random: &mut RandomSource) -> Generated<T> {
        self(random)
    }
}

/// A wrapper that stores generators in a type-erased way
pub struct BoxedGenerator<T> {
    generator: Box<dyn RandomGenerator<T>>,
}

impl<T> BoxedGenerator<T> {
    /// Create a new boxed generator
    pub fn new<G: RandomGenerator<T> + 'static>(generator: G) -> Self {
        Self {
            generator: Box::new(generator),
        }
    }

    /// Draw the next value
    pub fn next(&self, random: &mut RandomSource) -> Generated<T> {
        self.generator.next(random)
    }

    /// Draw `count` values, stopping at the first generation error
    pub fn samples(
        &self,
        random: &mut RandomSource,
        count: usize,
    ) -> Result<Vec<BoxedShrinkable<T>>, GenerationError> {
        (0..count).map(|_| self.next(random)).collect()
    }
}

impl<T> RandomGenerator<T> for BoxedGenerator<T> {
    fn next(&self, random: &mut RandomSource) -> Generated<T> {
        self.generator.next(random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrinkable::{Shrinkable, Unshrinkable};
    use rand::Rng;

    #[test]
    fn test_closure_generator() {
        let generator = BoxedGenerator::new(|random: &mut RandomSource| -> Generated<u8> {
            Ok(Unshrinkable::new(random.gen_range(0..10)).boxed())
        });
        let mut random = RandomSource::from_u64(1);
        for _ in 0..20 {
            let value = *generator.next(&mut random).unwrap().value();
            assert!(value < 10);
        }
    }

    #[test]
    fn test_samples_are_deterministic() {
        let generator = BoxedGenerator::new(|random: &mut RandomSource| -> Generated<u64> {
            Ok(Unshrinkable::new(random.r#gen::<u64>()).boxed())
        });
        let values = |seed| -> Vec<u64> {
            let mut random = RandomSource::from_u64(seed);
            generator
                .samples(&mut random, 10)
                .unwrap()
                .iter()
                .map(|s| *s.value())
                .collect()
        };
        assert_eq!(values(3), values(3));
        assert_ne!(values(3), values(4));
    }

    #[test]
    fn test_generation_errors_stop_sampling() {
        let generator = BoxedGenerator::new(|_: &mut RandomSource| -> Generated<u8> {
            Err(GenerationError::TooManyFilterMisses { misses: 1 })
        });
        let mut random = RandomSource::from_u64(0);
        assert!(generator.samples(&mut random, 3).is_err());
    }
}
