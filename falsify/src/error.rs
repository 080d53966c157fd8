//! Error types for configuration, generation and falsification.

use thiserror::Error;

/// The cause attached to a falsified value.
///
/// A falsifier that returns `false` produces no cause; one that returns an error or panics
/// produces a `PropertyError` that travels with the counterexample into the final result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Property check reported a failure with a message
    #[error("Property failed: {message}")]
    PropertyFailed { message: String },

    /// User code panicked while checking a value
    #[error("Property panicked: {message}")]
    Panicked { message: String },
}

impl PropertyError {
    /// Create a simple property failed error
    pub fn property_failed(message: impl Into<String>) -> Self {
        Self::PropertyFailed {
            message: message.into(),
        }
    }

    /// Build a `Panicked` error from a panic payload
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { message }
    }

    /// The message carried by this error
    pub fn message(&self) -> &str {
        match self {
            Self::PropertyFailed { message } | Self::Panicked { message } => message,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid number of tries (must be > 0)
    #[error("Invalid tries count: {0} (must be > 0)")]
    InvalidTries(u32),

    /// Invalid bound on shrink steps (must be > 0)
    #[error("Invalid max shrink steps: {0} (must be > 0)")]
    InvalidMaxShrinkSteps(u32),

    /// A seed string that cannot be turned back into a random source
    #[error("Malformed seed {seed:?}: expected an unsigned 64-bit decimal number")]
    MalformedSeed { seed: String },
}

/// Errors raised while drawing values from a generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A filtered arbitrary rejected too many consecutive values
    #[error("Too many filter misses: {misses} consecutive values were rejected")]
    TooManyFilterMisses { misses: usize },

    /// The domain has no values at all, e.g. `of` with an empty list
    #[error("Cannot generate values from an empty domain: {domain}")]
    EmptyDomain { domain: &'static str },
}

/// Errors raised when looking up an arbitrary for a type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No provider was registered for the requested type
    #[error("No arbitrary provider registered for type {type_name}")]
    NoProvider { type_name: &'static str },
}

/// Errors raised by the failure database
#[cfg(feature = "persistence")]
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failure database I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failure database is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_error_display() {
        let error = PropertyError::property_failed("list was not sorted");
        assert_eq!(format!("{}", error), "Property failed: list was not sorted");
        assert_eq!(error.message(), "list was not sorted");
    }

    #[test]
    fn test_panic_payload_conversion() {
        let payload = std::panic::catch_unwind(|| panic!("boom {}", 42)).unwrap_err();
        let error = PropertyError::from_panic(payload.as_ref());
        assert_eq!(
            error,
            PropertyError::Panicked {
                message: "boom 42".to_string()
            }
        );

        let payload = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(PropertyError::from_panic(payload.as_ref()).message(), "static");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidTries(0).to_string(),
            "Invalid tries count: 0 (must be > 0)"
        );
        let malformed = ConfigError::MalformedSeed {
            seed: "abc".to_string(),
        };
        assert!(malformed.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_generation_and_resolution_errors() {
        let error = GenerationError::TooManyFilterMisses { misses: 10_000 };
        assert!(error.to_string().contains("10000"));

        let error = ResolutionError::NoProvider {
            type_name: "my::Type",
        };
        assert_eq!(
            error.to_string(),
            "No arbitrary provider registered for type my::Type"
        );
    }
}
