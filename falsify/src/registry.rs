//! Type-keyed registry of arbitrary providers.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::collections::{strings, vecs};
use crate::combinators::zip;
use crate::error::ResolutionError;
use crate::primitives::{booleans, chars, doubles, floats, integers};

/// Priority of the providers installed by [`ArbitraryRegistry::with_defaults`]
pub const DEFAULT_PRIORITY: i32 = 0;

/// Builds an arbitrary, resolving component types through the registry it is called with
type Provider<T> =
    Arc<dyn Fn(&ArbitraryRegistry) -> Result<BoxedArbitrary<T>, ResolutionError> + Send + Sync>;

/// Invokes `$action!(<prefix> T)` for every type with a default provider
macro_rules! for_each_builtin {
    ($action:ident!($($prefix:tt)*)) => {
        $action!($($prefix)* bool);
        $action!($($prefix)* i8);
        $action!($($prefix)* i16);
        $action!($($prefix)* i32);
        $action!($($prefix)* i64);
        $action!($($prefix)* isize);
        $action!($($prefix)* u8);
        $action!($($prefix)* u16);
        $action!($($prefix)* u32);
        $action!($($prefix)* u64);
        $action!($($prefix)* usize);
        $action!($($prefix)* f32);
        $action!($($prefix)* f64);
        $action!($($prefix)* char);
        $action!($($prefix)* String);
    };
}

macro_rules! register_vec {
    ($registry:ident, $element:ty) => {
        $registry.register_vec::<$element>(DEFAULT_PRIORITY);
    };
}

macro_rules! register_pair {
    ($registry:ident, $first:ty, $second:ty) => {
        $registry.register_pair::<$first, $second>(DEFAULT_PRIORITY);
    };
}

macro_rules! register_pairs_with {
    ($registry:ident, $first:ty) => {
        for_each_builtin!(register_pair!($registry, $first,));
    };
}

struct Registration {
    priority: i32,
    /// A `Provider<T>` for the type the registration is filed under
    provider: Box<dyn Any + Send + Sync>,
}

struct Entry {
    type_name: &'static str,
    registrations: Vec<Registration>,
}

/// Maps types to the providers of their default arbitraries.
///
/// Several providers may be registered for one type; the one with the highest priority
/// wins, and among equal priorities the most recent registration. Providers of composite
/// types resolve their components when the composite is resolved, so overriding `i32`
/// also changes what `Vec<i32>` resolves to.
#[derive(Default)]
pub struct ArbitraryRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl ArbitraryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with providers for `bool`, every integer type, `f32`, `f64`, `char` and
    /// `String`, vectors of each of them and pairs of any two of them
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_PRIORITY, || booleans().boxed());
        registry.register_integer::<i8>();
        registry.register_integer::<i16>();
        registry.register_integer::<i32>();
        registry.register_integer::<i64>();
        registry.register_integer::<isize>();
        registry.register_integer::<u8>();
        registry.register_integer::<u16>();
        registry.register_integer::<u32>();
        registry.register_integer::<u64>();
        registry.register_integer::<usize>();
        registry.register(DEFAULT_PRIORITY, || floats().boxed());
        registry.register(DEFAULT_PRIORITY, || doubles().boxed());
        registry.register(DEFAULT_PRIORITY, || chars().boxed());
        registry.register(DEFAULT_PRIORITY, || strings().boxed());
        for_each_builtin!(register_vec!(registry,));
        for_each_builtin!(register_pairs_with!(registry,));
        registry
    }

    fn register_integer<N: crate::primitives::Integral>(&mut self) {
        self.register(DEFAULT_PRIORITY, || integers::<N>().boxed());
    }

    /// Register a provider for `T`
    pub fn register<T, F>(&mut self, priority: i32, provider: F)
    where
        T: Clone + 'static,
        F: Fn() -> BoxedArbitrary<T> + Send + Sync + 'static,
    {
        self.register_with(priority, move |_: &ArbitraryRegistry| Ok(provider()));
    }

    /// Register a provider for `T` that may resolve other types through the registry
    pub fn register_with<T, F>(&mut self, priority: i32, provider: F)
    where
        T: Clone + 'static,
        F: Fn(&ArbitraryRegistry) -> Result<BoxedArbitrary<T>, ResolutionError>
            + Send
            + Sync
            + 'static,
    {
        let provider: Provider<T> = Arc::new(provider);
        self.entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Entry {
                type_name: type_name::<T>(),
                registrations: Vec::new(),
            })
            .registrations
            .push(Registration {
                priority,
                provider: Box::new(provider),
            });
    }

    /// Register `Vec<E>`, built from whatever `E` resolves to
    pub fn register_vec<E: Clone + 'static>(&mut self, priority: i32) {
        self.register_with(priority, |registry: &ArbitraryRegistry| {
            Ok(vecs(registry.resolve::<E>()?).boxed())
        });
    }

    /// Register `(A, B)`, built from whatever `A` and `B` resolve to
    pub fn register_pair<A, B>(&mut self, priority: i32)
    where
        A: Clone + 'static,
        B: Clone + 'static,
    {
        self.register_with(priority, |registry: &ArbitraryRegistry| {
            Ok(zip(registry.resolve::<A>()?, registry.resolve::<B>()?).boxed())
        });
    }

    /// The arbitrary of the highest-priority provider for `T`.
    ///
    /// Fails with the missing type's name when `T`, or a component a composite provider
    /// needs, has no provider.
    pub fn resolve<T: Clone + 'static>(&self) -> Result<BoxedArbitrary<T>, ResolutionError> {
        let no_provider = || ResolutionError::NoProvider {
            type_name: type_name::<T>(),
        };
        let provider = self
            .entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| {
                entry
                    .registrations
                    .iter()
                    .max_by_key(|registration| registration.priority)
            })
            .and_then(|registration| registration.provider.downcast_ref::<Provider<T>>())
            .ok_or_else(no_provider)?;
        provider(self)
    }

    /// Check if a provider is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Remove all providers for `T`
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    /// Names of all types with a provider, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|entry| entry.type_name).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
