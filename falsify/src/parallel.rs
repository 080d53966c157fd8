//! Running independent properties on a pool of worker threads.
//!
//! Shrinkables are single-threaded, so a task builds and runs its property entirely on the
//! worker that picked it up. Only the arbitrary, the falsifier and the finished report cross
//! thread boundaries.

use std::fmt;
use std::panic;

use crossbeam::channel;
use tracing::debug;

use crate::arbitrary::Arbitrary;
use crate::config::PropertyConfiguration;
use crate::error::ConfigError;
use crate::execution::{PropertyExecutionResult, PropertyTest};
use crate::falsifier::Falsifier;

/// Configuration for parallel execution
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_threads: usize,
    /// Run on worker threads at all; otherwise tasks run in order on the calling thread
    pub enabled: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
            enabled: true,
        }
    }
}

impl ParallelConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn sequential() -> Self {
        Self {
            num_threads: 1,
            enabled: false,
        }
    }
}

/// Thread-independent summary of a property run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyStatus {
    Successful {
        checks: u32,
    },
    Failed {
        /// Debug rendering of the shrunk counterexample
        sample: String,
        /// Debug rendering of the first falsifying sample
        original_sample: String,
        shrink_steps: usize,
        cause: Option<String>,
    },
    Aborted {
        reason: String,
    },
    /// The property could not be started
    Misconfigured(ConfigError),
}

/// Outcome of one property in a suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReport {
    pub name: String,
    /// Seed of the run; absent if the property never started
    pub seed: Option<String>,
    pub status: PropertyStatus,
}

impl PropertyReport {
    fn new<T: fmt::Debug>(name: String, result: Result<PropertyExecutionResult<T>, ConfigError>) -> Self {
        let result = match result {
            Ok(result) => result,
            Err(error) => {
                return Self {
                    name,
                    seed: None,
                    status: PropertyStatus::Misconfigured(error),
                };
            }
        };
        let seed = Some(result.seed().to_string());
        let status = match result {
            PropertyExecutionResult::Successful { checks, .. } => PropertyStatus::Successful { checks },
            PropertyExecutionResult::Failed(failure) => PropertyStatus::Failed {
                sample: format!("{:?}", failure.sample),
                original_sample: format!("{:?}", failure.original_sample),
                shrink_steps: failure.shrink_steps,
                cause: failure.cause.map(|cause| cause.to_string()),
            },
            PropertyExecutionResult::Aborted { reason, .. } => PropertyStatus::Aborted { reason },
        };
        Self { name, seed, status }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.status, PropertyStatus::Successful { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, PropertyStatus::Failed { .. })
    }
}

type Task = Box<dyn FnOnce() -> PropertyReport + Send>;

/// A set of independent properties run together
#[derive(Default)]
pub struct PropertySuite {
    tasks: Vec<Task>,
}

impl PropertySuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property built from its parts
    pub fn property<T, A, F>(
        self,
        name: impl Into<String>,
        arbitrary: A,
        falsifier: F,
        configuration: PropertyConfiguration,
    ) -> Self
    where
        T: Clone + fmt::Debug + 'static,
        A: Arbitrary<T> + 'static,
        F: Falsifier<T> + Send + 'static,
    {
        let name = name.into();
        let test_name = name.clone();
        self.task(name, move || {
            PropertyTest::new(arbitrary, falsifier, configuration)
                .named(test_name)
                .run()
        })
    }

    /// Add a task that builds and runs its property itself
    pub fn task<T, R>(mut self, name: impl Into<String>, run: R) -> Self
    where
        T: fmt::Debug,
        R: FnOnce() -> Result<PropertyExecutionResult<T>, ConfigError> + Send + 'static,
    {
        let name = name.into();
        self.tasks
            .push(Box::new(move || PropertyReport::new(name, run())));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every property, returning reports in the order the properties were added.
    ///
    /// # Panics
    ///
    /// A panic on a worker thread is resumed on the calling thread.
    pub fn run(self, config: &ParallelConfig) -> Vec<PropertyReport> {
        let total = self.tasks.len();
        if !config.enabled || config.num_threads <= 1 || total <= 1 {
            debug!(properties = total, "running suite sequentially");
            return self.tasks.into_iter().map(|task| task()).collect();
        }

        let num_threads = config.num_threads.min(total);
        debug!(properties = total, threads = num_threads, "running suite in parallel");

        let (task_sender, task_receiver) = channel::unbounded::<(usize, Task)>();
        let (report_sender, report_receiver) = channel::unbounded::<(usize, PropertyReport)>();
        for task in self.tasks.into_iter().enumerate() {
            task_sender
                .send(task)
                .expect("task receiver is held until the workers are spawned");
        }
        drop(task_sender);

        let scoped = crossbeam::scope(|s| {
            let handles: Vec<_> = (0..num_threads)
                .map(|_| {
                    let tasks = task_receiver.clone();
                    let reports = report_sender.clone();
                    s.spawn(move |_| {
                        for (index, task) in tasks.iter() {
                            if reports.send((index, task())).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic::resume_unwind(payload);
                }
            }
        });
        if let Err(payload) = scoped {
            panic::resume_unwind(payload);
        }
        drop(report_sender);

        let mut reports: Vec<Option<PropertyReport>> = (0..total).map(|_| None).collect();
        for (index, report) in report_receiver.iter() {
            reports[index] = Some(report);
        }
        reports.into_iter().flatten().collect()
    }
}
