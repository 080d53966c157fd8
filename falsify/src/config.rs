//! Configuration types for controlling property runs.
//!
//! A [`PropertyConfiguration`] is resolved from the attributes of one property and a set of
//! [`PropertyDefaults`]. Attributes left at their sentinel values take the defaults.

use crate::error::ConfigError;
use crate::random::RandomSource;

/// Sentinel for "tries not set on the property"
pub const TRIES_NOT_SET: u32 = 0;

/// Sentinel for "max discard ratio not set on the property"
pub const MAX_DISCARD_RATIO_NOT_SET: u32 = 0;

/// Stereotype used when a property does not declare one
pub const DEFAULT_STEREOTYPE: &str = "Property";

/// How a falsified sample is shrunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShrinkingMode {
    /// Report the original sample
    Off,
    /// Stop after `max_shrink_steps` successful steps
    #[default]
    Bounded,
    /// Shrink until no simpler falsifying value exists
    Full,
}

/// Where samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Exhaustive when the whole domain fits into `tries`, random otherwise
    #[default]
    Auto,
    Randomized,
    /// Exhaustive, falling back to random generation when the domain is not enumerable
    Exhaustive,
}

/// How edge cases take part in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCasesMode {
    /// All edge cases are tried before random samples
    First,
    /// Edge cases are injected among random samples
    #[default]
    Mixin,
    None,
}

/// Seed selection for a property that failed in a previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfterFailureMode {
    /// Rerun with the seed of the last recorded failure
    #[default]
    PreviousSeed,
    /// Always draw a fresh seed
    RandomSeed,
}

/// Values used for everything a property does not set itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefaults {
    /// Number of checks per property
    pub tries: u32,
    /// Allowed discards per try before a run is aborted
    pub max_discard_ratio: u32,
    /// Bound on successful shrinking steps in [`ShrinkingMode::Bounded`]
    pub max_shrink_steps: u32,
}

impl Default for PropertyDefaults {
    fn default() -> Self {
        Self {
            tries: 1000,
            max_discard_ratio: 5,
            max_shrink_steps: 10_000,
        }
    }
}

impl PropertyDefaults {
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_max_discard_ratio(mut self, max_discard_ratio: u32) -> Self {
        self.max_discard_ratio = max_discard_ratio;
        self
    }

    pub fn with_max_shrink_steps(mut self, max_shrink_steps: u32) -> Self {
        self.max_shrink_steps = max_shrink_steps;
        self
    }

    /// Validate the defaults
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries == 0 {
            return Err(ConfigError::InvalidTries(self.tries));
        }
        if self.max_shrink_steps == 0 {
            return Err(ConfigError::InvalidMaxShrinkSteps(self.max_shrink_steps));
        }
        Ok(())
    }
}

/// What a single property declares about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAttributes {
    pub stereotype: String,
    pub seed: Option<String>,
    pub tries: u32,
    pub max_discard_ratio: u32,
    pub shrinking: ShrinkingMode,
    pub generation: GenerationMode,
    pub edge_cases: EdgeCasesMode,
    pub after_failure: AfterFailureMode,
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self {
            stereotype: DEFAULT_STEREOTYPE.to_string(),
            seed: None,
            tries: TRIES_NOT_SET,
            max_discard_ratio: MAX_DISCARD_RATIO_NOT_SET,
            shrinking: ShrinkingMode::default(),
            generation: GenerationMode::default(),
            edge_cases: EdgeCasesMode::default(),
            after_failure: AfterFailureMode::default(),
        }
    }
}

impl PropertyAttributes {
    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotype = stereotype.into();
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_max_discard_ratio(mut self, max_discard_ratio: u32) -> Self {
        self.max_discard_ratio = max_discard_ratio;
        self
    }

    pub fn with_shrinking(mut self, shrinking: ShrinkingMode) -> Self {
        self.shrinking = shrinking;
        self
    }

    pub fn with_generation(mut self, generation: GenerationMode) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_edge_cases(mut self, edge_cases: EdgeCasesMode) -> Self {
        self.edge_cases = edge_cases;
        self
    }

    pub fn with_after_failure(mut self, after_failure: AfterFailureMode) -> Self {
        self.after_failure = after_failure;
        self
    }
}

/// Fully resolved run parameters of one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyConfiguration {
    pub stereotype: String,
    pub seed: Option<String>,
    pub tries: u32,
    pub max_discard_ratio: u32,
    pub shrinking: ShrinkingMode,
    pub max_shrink_steps: u32,
    pub generation: GenerationMode,
    pub edge_cases: EdgeCasesMode,
    pub after_failure: AfterFailureMode,
}

impl Default for PropertyConfiguration {
    fn default() -> Self {
        Self::from(&PropertyAttributes::default(), &PropertyDefaults::default())
    }
}

impl PropertyConfiguration {
    /// Resolve a property's attributes against the defaults
    pub fn from(attributes: &PropertyAttributes, defaults: &PropertyDefaults) -> Self {
        let tries = if attributes.tries == TRIES_NOT_SET {
            defaults.tries
        } else {
            attributes.tries
        };
        let max_discard_ratio = if attributes.max_discard_ratio == MAX_DISCARD_RATIO_NOT_SET {
            defaults.max_discard_ratio
        } else {
            attributes.max_discard_ratio
        };
        Self {
            stereotype: attributes.stereotype.clone(),
            seed: attributes.seed.clone(),
            tries,
            max_discard_ratio,
            shrinking: attributes.shrinking,
            max_shrink_steps: defaults.max_shrink_steps,
            generation: attributes.generation,
            edge_cases: attributes.edge_cases,
            after_failure: attributes.after_failure,
        }
    }

    /// Same configuration with another seed
    pub fn with_seed(&self, seed: impl Into<String>) -> Self {
        Self {
            seed: Some(seed.into()),
            ..self.clone()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries == 0 {
            return Err(ConfigError::InvalidTries(self.tries));
        }
        if self.shrinking == ShrinkingMode::Bounded && self.max_shrink_steps == 0 {
            return Err(ConfigError::InvalidMaxShrinkSteps(self.max_shrink_steps));
        }
        if let Some(seed) = &self.seed {
            RandomSource::from_seed(seed)?;
        }
        Ok(())
    }

    /// Upper bound on discarded samples before a run is aborted
    pub fn max_discards(&self) -> u64 {
        u64::from(self.tries) * u64::from(self.max_discard_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_attributes_take_defaults() {
        let defaults = PropertyDefaults::default()
            .with_tries(500)
            .with_max_discard_ratio(3);
        let configuration = PropertyConfiguration::from(&PropertyAttributes::default(), &defaults);
        assert_eq!(configuration.tries, 500);
        assert_eq!(configuration.max_discard_ratio, 3);
        assert_eq!(configuration.stereotype, DEFAULT_STEREOTYPE);
        assert_eq!(configuration.seed, None);
        assert_eq!(configuration.max_shrink_steps, 10_000);
    }

    #[test]
    fn test_set_attributes_win() {
        let attributes = PropertyAttributes::default()
            .with_tries(42)
            .with_max_discard_ratio(7)
            .with_seed("12345")
            .with_stereotype("Example")
            .with_shrinking(ShrinkingMode::Full)
            .with_generation(GenerationMode::Exhaustive)
            .with_edge_cases(EdgeCasesMode::First)
            .with_after_failure(AfterFailureMode::RandomSeed);
        let configuration = PropertyConfiguration::from(&attributes, &PropertyDefaults::default());
        assert_eq!(configuration.tries, 42);
        assert_eq!(configuration.max_discard_ratio, 7);
        assert_eq!(configuration.seed.as_deref(), Some("12345"));
        assert_eq!(configuration.stereotype, "Example");
        assert_eq!(configuration.shrinking, ShrinkingMode::Full);
        assert_eq!(configuration.generation, GenerationMode::Exhaustive);
        assert_eq!(configuration.edge_cases, EdgeCasesMode::First);
        assert_eq!(configuration.after_failure, AfterFailureMode::RandomSeed);
    }

    #[test]
    fn test_resolution_is_pure() {
        let attributes = PropertyAttributes::default().with_tries(9);
        let defaults = PropertyDefaults::default();
        assert_eq!(
            PropertyConfiguration::from(&attributes, &defaults),
            PropertyConfiguration::from(&attributes, &defaults)
        );
    }

    #[test]
    fn test_with_seed_changes_only_the_seed() {
        let configuration = PropertyConfiguration::default();
        let seeded = configuration.with_seed("99");
        assert_eq!(seeded.seed.as_deref(), Some("99"));
        assert_eq!(seeded.tries, configuration.tries);
        assert_eq!(configuration.seed, None);
    }

    #[test]
    fn test_validation() {
        let mut configuration = PropertyConfiguration::default();
        assert!(configuration.validate().is_ok());

        configuration.tries = 0;
        assert_eq!(configuration.validate(), Err(ConfigError::InvalidTries(0)));

        let malformed = PropertyConfiguration::default().with_seed("not-a-seed");
        assert_eq!(
            malformed.validate(),
            Err(ConfigError::MalformedSeed {
                seed: "not-a-seed".to_string()
            })
        );

        let mut unbounded = PropertyConfiguration::default();
        unbounded.max_shrink_steps = 0;
        assert!(unbounded.validate().is_err());
        unbounded.shrinking = ShrinkingMode::Full;
        assert!(unbounded.validate().is_ok());

        assert!(PropertyDefaults::default().with_tries(0).validate().is_err());
    }

    #[test]
    fn test_max_discards() {
        let configuration = PropertyConfiguration::from(
            &PropertyAttributes::default().with_tries(10).with_max_discard_ratio(5),
            &PropertyDefaults::default(),
        );
        assert_eq!(configuration.max_discards(), 50);
    }
}
