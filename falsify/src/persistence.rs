//! Failure database: remembers the seed of each property's last failing run.
//!
//! Records live in one JSON file keyed by property name, so a failing property can be rerun
//! with the seed that made it fail until it passes again.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PersistenceError;
use crate::execution::PropertyFailure;

/// The last failure of one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The seed that produced this failure
    pub seed: String,

    /// Debug rendering of the shrunk counterexample
    pub counterexample: String,

    /// Number of shrink steps that were performed
    pub shrink_steps: usize,

    /// When this failure was recorded
    pub timestamp: SystemTime,
}

impl FailureRecord {
    pub fn new(seed: impl Into<String>, counterexample: impl Into<String>, shrink_steps: usize) -> Self {
        Self {
            seed: seed.into(),
            counterexample: counterexample.into(),
            shrink_steps,
            timestamp: SystemTime::now(),
        }
    }

    pub fn from_failure<T: fmt::Debug>(failure: &PropertyFailure<T>) -> Self {
        Self::new(
            failure.seed.clone(),
            format!("{:?}", failure.sample),
            failure.shrink_steps,
        )
    }
}

/// JSON file of [`FailureRecord`]s keyed by property name
#[derive(Debug, Clone)]
pub struct FailureDatabase {
    path: PathBuf,
}

impl FailureDatabase {
    /// Use the database file at `path`; the file and its parent directories are created on
    /// the first write
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The last recorded failure of `property`
    pub fn previous_failure(&self, property: &str) -> Result<Option<FailureRecord>, PersistenceError> {
        Ok(self.load()?.remove(property))
    }

    /// Record the failure of a property run
    pub fn record_failure<T: fmt::Debug>(
        &self,
        property: &str,
        failure: &PropertyFailure<T>,
    ) -> Result<(), PersistenceError> {
        self.record(property, FailureRecord::from_failure(failure))
    }

    /// Store `record` as the last failure of `property`
    pub fn record(&self, property: &str, record: FailureRecord) -> Result<(), PersistenceError> {
        let mut records = self.load()?;
        debug!(property, seed = %record.seed, "recording failure");
        records.insert(property.to_string(), record);
        self.save(&records)
    }

    /// Forget the failure of `property`; returns whether one was recorded
    pub fn clear(&self, property: &str) -> Result<bool, PersistenceError> {
        let mut records = self.load()?;
        if records.remove(property).is_none() {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }

    /// Names of all properties with a recorded failure
    pub fn failing_properties(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.load()?.into_keys().collect())
    }

    fn load(&self) -> Result<BTreeMap<String, FailureRecord>, PersistenceError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, records: &BTreeMap<String, FailureRecord>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
