//! Property execution: the tries loop, discard accounting and shrinking of the first
//! falsifying sample.

use std::fmt;

use rand::Rng;
use tracing::{debug, warn};

use crate::arbitrary::Arbitrary;
use crate::config::{EdgeCasesMode, GenerationMode, PropertyConfiguration, ShrinkingMode};
use crate::edge_cases::EdgeCases;
use crate::error::{ConfigError, PropertyError};
use crate::falsifier::{Falsifier, TryExecutionResult};
use crate::generator::{BoxedGenerator, Generated};
use crate::random::RandomSource;
use crate::shrinkable::{Shrinkable, Unshrinkable};
use crate::shrinking::{FalsificationResult, ShrinkResult, shrink_to_end};

/// Reason reported when a run discarded too many samples
pub const TOO_MANY_DISCARDS: &str = "too many discards";

/// Reason reported when a run produced no sample at all
pub const NO_SAMPLES: &str = "no samples were generated";

/// Largest domain enumerated in [`GenerationMode::Exhaustive`]
pub const MAX_EXHAUSTIVE_SAMPLES: u64 = u32::MAX as u64;

/// Probability (1 in N) of drawing an edge case in [`EdgeCasesMode::Mixin`]
const EDGE_CASE_MIXIN_RATIO: u32 = 20;

/// A falsified property with its shrunk counterexample
#[derive(Debug, Clone)]
pub struct PropertyFailure<T> {
    /// Name of the property
    pub name: String,
    /// Seed that reproduces the run
    pub seed: String,
    /// The first falsifying sample
    pub original_sample: T,
    /// The simplest falsifying sample found by shrinking
    pub sample: T,
    /// Successful shrinking steps
    pub shrink_steps: usize,
    /// Failure reported for `sample`, if any
    pub cause: Option<PropertyError>,
    /// Samples drawn, including discarded ones
    pub tries: u32,
    /// Samples checked against the property
    pub checks: u32,
}

impl<T: fmt::Debug> fmt::Display for PropertyFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Property '{}' falsified (seed {})", self.name, self.seed)?;
        writeln!(f, "  Sample: {:?}", self.sample)?;
        if self.shrink_steps > 0 {
            writeln!(
                f,
                "  Original sample: {:?} ({} shrink steps)",
                self.original_sample, self.shrink_steps
            )?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "  Cause: {}", cause)?;
        }
        write!(f, "  After {} tries and {} checks", self.tries, self.checks)
    }
}

/// Outcome of a property run
#[derive(Debug, Clone)]
pub enum PropertyExecutionResult<T> {
    /// Every checked sample satisfied the property
    Successful { seed: String, tries: u32, checks: u32 },
    /// A sample falsified the property
    Failed(PropertyFailure<T>),
    /// The run could not produce enough valid samples
    Aborted {
        seed: String,
        reason: String,
        tries: u32,
        checks: u32,
    },
}

impl<T> PropertyExecutionResult<T> {
    /// Seed that reproduces this run
    pub fn seed(&self) -> &str {
        match self {
            Self::Successful { seed, .. } | Self::Aborted { seed, .. } => seed,
            Self::Failed(failure) => &failure.seed,
        }
    }

    pub fn checks(&self) -> u32 {
        match self {
            Self::Successful { checks, .. } | Self::Aborted { checks, .. } => *checks,
            Self::Failed(failure) => failure.checks,
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    pub fn failure(&self) -> Option<&PropertyFailure<T>> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The falsifier with the property's assumption applied first
struct Assumed<'a, T, F> {
    falsifier: &'a F,
    assumption: Option<&'a dyn Fn(&T) -> bool>,
}

impl<T, F: Falsifier<T>> Falsifier<T> for Assumed<'_, T, F> {
    fn execute(&self, value: &T) -> TryExecutionResult {
        match self.assumption {
            Some(assumption) if !assumption(value) => TryExecutionResult::Invalid,
            _ => self.falsifier.execute(value),
        }
    }
}

enum SampleSource<T> {
    Exhaustive(Box<dyn Iterator<Item = T>>),
    Randomized {
        generator: BoxedGenerator<T>,
        edge_cases: EdgeCases<T>,
        mode: EdgeCasesMode,
        next_edge_case: usize,
    },
}

impl<T: Clone + 'static> SampleSource<T> {
    fn next(&mut self, random: &mut RandomSource) -> Option<Generated<T>> {
        match self {
            Self::Exhaustive(values) => values.next().map(|value| Ok(Unshrinkable::new(value).boxed())),
            Self::Randomized {
                generator,
                edge_cases,
                mode,
                next_edge_case,
            } => {
                if *mode == EdgeCasesMode::First && *next_edge_case < edge_cases.len() {
                    let edge_case = edge_cases.get(*next_edge_case).cloned();
                    *next_edge_case += 1;
                    return edge_case.map(Ok);
                }
                if *mode == EdgeCasesMode::Mixin
                    && !edge_cases.is_empty()
                    && random.gen_ratio(1, EDGE_CASE_MIXIN_RATIO)
                {
                    let index = random.gen_range(0..edge_cases.len());
                    return edge_cases.get(index).cloned().map(Ok);
                }
                Some(generator.next(random))
            }
        }
    }
}

type ShrinkReporter<T> = Box<dyn FnMut(&FalsificationResult<T>)>;

/// A property: an arbitrary, a falsifier and the configuration to run them with
pub struct PropertyTest<T, A, F> {
    name: String,
    arbitrary: A,
    falsifier: F,
    configuration: PropertyConfiguration,
    assumption: Option<Box<dyn Fn(&T) -> bool>>,
    shrink_reporter: Option<ShrinkReporter<T>>,
    #[cfg(feature = "persistence")]
    database: Option<crate::persistence::FailureDatabase>,
}

impl<T, A, F> PropertyTest<T, A, F>
where
    T: Clone + fmt::Debug + 'static,
    A: Arbitrary<T>,
    F: Falsifier<T>,
{
    pub fn new(arbitrary: A, falsifier: F, configuration: PropertyConfiguration) -> Self {
        Self {
            name: configuration.stereotype.to_lowercase(),
            arbitrary,
            falsifier,
            configuration,
            assumption: None,
            shrink_reporter: None,
            #[cfg(feature = "persistence")]
            database: None,
        }
    }

    /// Name used in logs, reports and the failure database
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Treat samples rejected by `assumption` as discarded, during checking and shrinking
    pub fn with_assumption<P>(mut self, assumption: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.assumption = Some(Box::new(assumption));
        self
    }

    /// Called after every successful shrinking step
    pub fn with_shrink_reporter<R>(mut self, reporter: R) -> Self
    where
        R: FnMut(&FalsificationResult<T>) + 'static,
    {
        self.shrink_reporter = Some(Box::new(reporter));
        self
    }

    /// Reuse and record failing seeds
    #[cfg(feature = "persistence")]
    pub fn with_failure_database(mut self, database: crate::persistence::FailureDatabase) -> Self {
        self.database = Some(database);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configuration(&self) -> &PropertyConfiguration {
        &self.configuration
    }

    /// Run the property.
    ///
    /// Only an invalid configuration is an error; falsification, panics in user code and
    /// generation problems are all reported through the result.
    pub fn run(mut self) -> Result<PropertyExecutionResult<T>, ConfigError> {
        self.configuration.validate()?;
        let mut random = match self.initial_seed() {
            Some(seed) => RandomSource::from_seed(&seed)?,
            None => RandomSource::new(),
        };
        let seed = random.seed().to_string();
        debug!(
            property = %self.name,
            seed = %seed,
            tries = self.configuration.tries,
            "running property"
        );

        let (mut source, tries) = self.sample_source();
        let max_discards = u64::from(tries) * u64::from(self.configuration.max_discard_ratio);
        let falsifier = Assumed {
            falsifier: &self.falsifier,
            assumption: self.assumption.as_deref(),
        };

        let mut drawn: u32 = 0;
        let mut checks: u32 = 0;
        let mut discards: u64 = 0;
        while checks < tries {
            let shrinkable = match source.next(&mut random) {
                None => break,
                Some(Ok(shrinkable)) => shrinkable,
                Some(Err(error)) => {
                    warn!(property = %self.name, seed = %seed, error = %error, "generation failed");
                    return Ok(PropertyExecutionResult::Aborted {
                        seed,
                        reason: error.to_string(),
                        tries: drawn,
                        checks,
                    });
                }
            };
            drawn += 1;

            match falsifier.execute(shrinkable.value()) {
                TryExecutionResult::Satisfied => checks += 1,
                TryExecutionResult::Invalid => {
                    discards += 1;
                    if discards > max_discards {
                        debug!(property = %self.name, discards, "aborting run");
                        return Ok(PropertyExecutionResult::Aborted {
                            seed,
                            reason: TOO_MANY_DISCARDS.to_string(),
                            tries: drawn,
                            checks,
                        });
                    }
                }
                TryExecutionResult::Falsified(cause) => {
                    checks += 1;
                    let start = FalsificationResult::new(shrinkable, cause);
                    let shrunk = shrink_falsified(
                        start,
                        &falsifier,
                        &self.configuration,
                        self.shrink_reporter.take(),
                    );
                    let failure = PropertyFailure {
                        name: self.name.clone(),
                        seed,
                        original_sample: shrunk.original,
                        sample: shrunk.minimal,
                        shrink_steps: shrunk.shrink_steps,
                        cause: shrunk.cause,
                        tries: drawn,
                        checks,
                    };
                    debug!(
                        property = %self.name,
                        seed = %failure.seed,
                        shrink_steps = failure.shrink_steps,
                        "property falsified"
                    );
                    self.record_failure(&failure);
                    return Ok(PropertyExecutionResult::Failed(failure));
                }
            }
        }

        if checks == 0 {
            let reason = if discards > 0 { TOO_MANY_DISCARDS } else { NO_SAMPLES };
            return Ok(PropertyExecutionResult::Aborted {
                seed,
                reason: reason.to_string(),
                tries: drawn,
                checks,
            });
        }
        self.clear_failure();
        debug!(property = %self.name, checks, discards, "property satisfied");
        Ok(PropertyExecutionResult::Successful {
            seed,
            tries: drawn,
            checks,
        })
    }

    /// The sample source for this run, and how many checks it should make
    fn sample_source(&self) -> (SampleSource<T>, u32) {
        let tries = self.configuration.tries;
        let exhaustive = match self.configuration.generation {
            GenerationMode::Randomized => None,
            GenerationMode::Auto => self.arbitrary.exhaustive(u64::from(tries)),
            GenerationMode::Exhaustive => {
                let exhaustive = self.arbitrary.exhaustive(MAX_EXHAUSTIVE_SAMPLES);
                if exhaustive.is_none() {
                    warn!(
                        property = %self.name,
                        "exhaustive generation is not available, falling back to randomized generation"
                    );
                }
                exhaustive
            }
        };
        if let Some(exhaustive) = exhaustive {
            let count = u32::try_from(exhaustive.max_count()).unwrap_or(u32::MAX);
            debug!(property = %self.name, count, "generating exhaustively");
            return (SampleSource::Exhaustive(exhaustive.iter()), count.max(1));
        }

        let gen_size = tries as usize;
        let edge_cases = match self.configuration.edge_cases {
            EdgeCasesMode::None => EdgeCases::none(),
            EdgeCasesMode::First | EdgeCasesMode::Mixin => self.arbitrary.edge_cases(gen_size),
        };
        let source = SampleSource::Randomized {
            generator: self.arbitrary.generator(gen_size),
            edge_cases,
            mode: self.configuration.edge_cases,
            next_edge_case: 0,
        };
        (source, tries)
    }

    fn initial_seed(&self) -> Option<String> {
        if let Some(seed) = &self.configuration.seed {
            return Some(seed.clone());
        }
        self.previous_failure_seed()
    }

    #[cfg(feature = "persistence")]
    fn previous_failure_seed(&self) -> Option<String> {
        use crate::config::AfterFailureMode;

        if self.configuration.after_failure != AfterFailureMode::PreviousSeed {
            return None;
        }
        let database = self.database.as_ref()?;
        match database.previous_failure(&self.name) {
            Ok(record) => record.map(|record| record.seed),
            Err(error) => {
                warn!(property = %self.name, error = %error, "could not read failure database");
                None
            }
        }
    }

    #[cfg(not(feature = "persistence"))]
    fn previous_failure_seed(&self) -> Option<String> {
        None
    }

    #[cfg(feature = "persistence")]
    fn record_failure(&self, failure: &PropertyFailure<T>) {
        if let Some(database) = &self.database {
            if let Err(error) = database.record_failure(&self.name, failure) {
                warn!(property = %self.name, error = %error, "could not record failure");
            }
        }
    }

    #[cfg(not(feature = "persistence"))]
    fn record_failure(&self, _failure: &PropertyFailure<T>) {}

    #[cfg(feature = "persistence")]
    fn clear_failure(&self) {
        if let Some(database) = &self.database {
            if let Err(error) = database.clear(&self.name) {
                warn!(property = %self.name, error = %error, "could not clear failure record");
            }
        }
    }

    #[cfg(not(feature = "persistence"))]
    fn clear_failure(&self) {}
}

fn shrink_falsified<T: Clone + 'static>(
    start: FalsificationResult<T>,
    falsifier: &dyn Falsifier<T>,
    configuration: &PropertyConfiguration,
    mut reporter: Option<ShrinkReporter<T>>,
) -> ShrinkResult<T> {
    let report = move |step: &FalsificationResult<T>| {
        if let Some(reporter) = reporter.as_mut() {
            reporter(step);
        }
    };
    match configuration.shrinking {
        ShrinkingMode::Off => ShrinkResult::no_shrinking(&start),
        ShrinkingMode::Bounded => {
            let max_steps = configuration.max_shrink_steps as usize;
            shrink_to_end(start, falsifier, Some(max_steps), report)
        }
        ShrinkingMode::Full => shrink_to_end(start, falsifier, None, report),
    }
}

/// Run a property with the default configuration
pub fn check<T, A, F>(arbitrary: A, falsifier: F) -> Result<PropertyExecutionResult<T>, ConfigError>
where
    T: Clone + fmt::Debug + 'static,
    A: Arbitrary<T>,
    F: Falsifier<T>,
{
    PropertyTest::new(arbitrary, falsifier, PropertyConfiguration::default()).run()
}

/// Run a property with an explicit configuration
pub fn check_with_config<T, A, F>(
    arbitrary: A,
    falsifier: F,
    configuration: PropertyConfiguration,
) -> Result<PropertyExecutionResult<T>, ConfigError>
where
    T: Clone + fmt::Debug + 'static,
    A: Arbitrary<T>,
    F: Falsifier<T>,
{
    PropertyTest::new(arbitrary, falsifier, configuration).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PropertyAttributes, PropertyDefaults};
    use crate::primitives::{integers, just};

    fn configuration(attributes: PropertyAttributes) -> PropertyConfiguration {
        PropertyConfiguration::from(&attributes, &PropertyDefaults::default())
    }

    #[test]
    fn test_successful_run_checks_tries_times() {
        let result = check_with_config(
            integers::<i32>(),
            |n: &i32| n.checked_add(0) == Some(*n),
            configuration(PropertyAttributes::default().with_tries(50)),
        )
        .unwrap();
        assert!(result.is_successful());
        assert_eq!(result.checks(), 50);
    }

    #[test]
    fn test_failure_is_shrunk() {
        let result = check(integers::<u32>(), |n: &u32| *n < 1000).unwrap();
        let failure = result.failure().unwrap();
        assert_eq!(failure.sample, 1000);
        assert!(failure.original_sample >= 1000);
    }

    #[test]
    fn test_shrinking_off_keeps_original() {
        let result = check_with_config(
            integers::<u32>().between(0, 1_000_000),
            |n: &u32| *n < 10,
            configuration(
                PropertyAttributes::default()
                    .with_shrinking(ShrinkingMode::Off)
                    .with_edge_cases(EdgeCasesMode::None),
            ),
        )
        .unwrap();
        let failure = result.failure().unwrap();
        assert_eq!(failure.sample, failure.original_sample);
        assert_eq!(failure.shrink_steps, 0);
    }

    #[test]
    fn test_same_seed_same_counterexample() {
        let run = || {
            check_with_config(
                integers::<i64>(),
                |n: &i64| n % 7 != 3,
                configuration(
                    PropertyAttributes::default()
                        .with_seed("4242")
                        .with_shrinking(ShrinkingMode::Off),
                ),
            )
            .unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(first.seed(), "4242");
        assert_eq!(
            first.failure().map(|f| f.sample),
            second.failure().map(|f| f.sample)
        );
    }

    #[test]
    fn test_too_many_discards_abort() {
        let result = PropertyTest::new(
            integers::<u8>(),
            |_: &u8| true,
            configuration(
                PropertyAttributes::default()
                    .with_tries(10)
                    .with_max_discard_ratio(2)
                    .with_generation(GenerationMode::Randomized),
            ),
        )
        .with_assumption(|_| false)
        .run()
        .unwrap();
        match result {
            PropertyExecutionResult::Aborted {
                reason,
                tries,
                checks,
                ..
            } => {
                assert_eq!(reason, TOO_MANY_DISCARDS);
                assert_eq!(tries, 21);
                assert_eq!(checks, 0);
            }
            other => panic!("expected abort, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_mode_enumerates_small_domains() {
        let result = check(integers::<u8>().between(1, 10), |n: &u8| *n <= 10).unwrap();
        assert!(result.is_successful());
        assert_eq!(result.checks(), 10);
    }

    #[test]
    fn test_exhaustive_mode_falls_back_to_random() {
        let result = check_with_config(
            integers::<u64>(),
            |_: &u64| true,
            configuration(
                PropertyAttributes::default()
                    .with_tries(25)
                    .with_generation(GenerationMode::Exhaustive),
            ),
        )
        .unwrap();
        assert!(result.is_successful());
        assert_eq!(result.checks(), 25);
    }

    #[test]
    fn test_edge_cases_first_finds_boundaries() {
        let result = check_with_config(
            integers::<i64>(),
            |n: &i64| *n != i64::MIN,
            configuration(
                PropertyAttributes::default()
                    .with_tries(5)
                    .with_edge_cases(EdgeCasesMode::First)
                    .with_generation(GenerationMode::Randomized),
            ),
        )
        .unwrap();
        let failure = result.failure().unwrap();
        assert_eq!(failure.sample, i64::MIN);
        assert_eq!(failure.tries, 2);
    }

    #[test]
    fn test_panics_are_failures_with_cause() {
        let result = check(integers::<i32>().between(0, 100), |n: &i32| {
            assert!(*n < 50, "value {} too large", n);
            true
        })
        .unwrap();
        let failure = result.failure().unwrap();
        assert_eq!(failure.sample, 50);
        assert_eq!(
            failure.cause,
            Some(PropertyError::Panicked {
                message: "value 50 too large".to_string()
            })
        );
    }

    #[test]
    fn test_generation_errors_abort() {
        let result = check(just(1u8).filter(|n| *n > 1), |_: &u8| true).unwrap();
        assert!(result.is_aborted());
    }

    #[test]
    fn test_invalid_configuration_is_an_error() {
        let result = check_with_config(
            just(0u8),
            |_: &u8| true,
            configuration(PropertyAttributes::default().with_seed("seed")),
        );
        assert!(matches!(result, Err(ConfigError::MalformedSeed { .. })));
    }

    #[test]
    fn test_shrink_reporter_sees_every_step() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let steps = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&steps);
        let result = PropertyTest::new(
            integers::<u32>().between(0, 1000),
            |n: &u32| *n < 10,
            configuration(
                PropertyAttributes::default()
                    .with_seed("7")
                    .with_edge_cases(EdgeCasesMode::None)
                    .with_generation(GenerationMode::Randomized),
            ),
        )
        .named("below ten")
        .with_shrink_reporter(move |step| recorded.borrow_mut().push(*step.value()))
        .run()
        .unwrap();
        let failure = result.failure().unwrap();
        assert_eq!(failure.name, "below ten");
        assert_eq!(failure.sample, 10);
        assert_eq!(steps.borrow().len(), failure.shrink_steps);
        if failure.shrink_steps > 0 {
            assert_eq!(steps.borrow().last().copied(), Some(10));
        }
        assert!(failure.to_string().contains("below ten"));
    }
}
