#![allow(clippy::type_complexity)]

//! # Falsify - Generation and Shrinking for Property-Based Testing
//!
//! Falsify draws values from domains described by [`Arbitrary`] types, checks them against a
//! property, and shrinks the first falsifying value to a minimal counterexample. Domains can
//! be sampled randomly, enumerated exhaustively when they are small, and probed with their
//! edge cases.
//!
//! ## Quick Start
//!
//! ```rust
//! use falsify::{Arbitrary, check, integers, strings};
//!
//! let result = check(integers::<u32>(), |n: &u32| *n < 1000).unwrap();
//! let failure = result.failure().unwrap();
//! assert_eq!(failure.sample, 1000);
//!
//! let result = check(
//!     strings().with_chars(falsify::chars().range('a', 'z')),
//!     |s: &String| s.len() < 3,
//! )
//! .unwrap();
//! assert_eq!(result.failure().unwrap().sample, "aaa");
//! # let _ = integers::<u8>().between(1, 5).map(|n| n * 2);
//! ```
//!
//! ## Shrinking
//!
//! Every generated value is a [`Shrinkable`]: it knows its [`ShrinkingDistance`] from the
//! simplest value of its domain and offers strictly simpler candidates. A
//! [`ShrinkingSequence`] walks those candidates greedily, keeping the first one that still
//! falsifies the property.

pub mod arbitrary;
pub mod collections;
pub mod combinators;
pub mod config;
pub mod distance;
pub mod edge_cases;
pub mod error;
pub mod execution;
pub mod exhaustive;
pub mod falsifier;
pub mod generator;
pub mod parallel;
#[cfg(feature = "persistence")]
pub mod persistence;
pub mod primitives;
pub mod random;
pub mod registry;
pub mod shrinkable;
pub mod shrinking;

// Re-export the main public API
pub use arbitrary::{Arbitrary, BoxedArbitrary};
pub use collections::{
    ShrinkableContainer, StringArbitrary, VecArbitrary, shrinkable_string, shrinkable_vec,
    strings, vecs,
};
pub use combinators::{combine, combine2, combine3, combine4, zip};
pub use config::{
    AfterFailureMode, EdgeCasesMode, GenerationMode, PropertyAttributes, PropertyConfiguration,
    PropertyDefaults, ShrinkingMode,
};
pub use distance::ShrinkingDistance;
pub use edge_cases::EdgeCases;
pub use error::{ConfigError, GenerationError, PropertyError, ResolutionError};
#[cfg(feature = "persistence")]
pub use error::PersistenceError;
pub use execution::{
    PropertyExecutionResult, PropertyFailure, PropertyTest, check, check_with_config,
};
pub use exhaustive::ExhaustiveGenerator;
pub use falsifier::{Falsifier, TryExecutionResult, checked};
pub use generator::{BoxedGenerator, RandomGenerator};
pub use parallel::{ParallelConfig, PropertyReport, PropertyStatus, PropertySuite};
#[cfg(feature = "persistence")]
pub use persistence::{FailureDatabase, FailureRecord};
pub use primitives::{
    ShrinkableInteger, booleans, chars, doubles, floats, integers, just, of,
};
pub use random::RandomSource;
pub use registry::ArbitraryRegistry;
pub use shrinkable::{BoxedShrinkable, Shrinkable, Unshrinkable};
pub use shrinking::{FalsificationResult, ShrinkResult, ShrinkingSequence, shrink_to_end};
