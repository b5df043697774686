use crate::{ConfigError, Properties};

pub const COUNT_KEY: &str = "count";
pub const THREADS_KEY: &str = "threads";
pub const RATIO_KEY: &str = "ratio";

/// The shape of a workload run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkloadConfig {
    /// Writes performed by each writer task. Must be positive.
    pub operations_per_task: usize,
    /// Writer and reader tasks combined.
    pub total_tasks: usize,
    /// Share of `total_tasks` that write. Within `[0, 1]`.
    pub write_fraction: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            operations_per_task: 10,
            total_tasks: 5,
            write_fraction: 0.8,
        }
    }
}

/// Task counts derived from a [`WorkloadConfig`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WorkloadPlan {
    pub num_writers: usize,
    pub num_readers: usize,
    pub operations_per_writer: usize,
    pub operations_per_reader: usize,
}

impl WorkloadConfig {
    /// Reads `count`, `threads` and `ratio`, using the defaults for absent keys.
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        let defaults = WorkloadConfig::default();
        let config = WorkloadConfig {
            operations_per_task: properties.parse_or(COUNT_KEY, defaults.operations_per_task)?,
            total_tasks: properties.parse_or(THREADS_KEY, defaults.total_tasks)?,
            write_fraction: properties.parse_or(RATIO_KEY, defaults.write_fraction)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.operations_per_task == 0 {
            return Err(ConfigError::NoOperations);
        }
        if !(0.0..=1.0).contains(&self.write_fraction) {
            // Also rejects NaN.
            return Err(ConfigError::WriteFractionOutOfRange(self.write_fraction));
        }
        Ok(())
    }

    /// Splits the tasks into writers and readers.
    ///
    /// Writers are `floor(total_tasks * write_fraction)`, raised to one if any writes were
    /// requested at all. Each reader sweeps as many positions as the writers append in total,
    /// or `operations_per_task` positions when there are no writers. Fails if the operation
    /// count of the whole run does not fit in a `usize`.
    pub fn plan(&self) -> Result<WorkloadPlan, ConfigError> {
        self.validate()?;
        // The float product can round past `total_tasks` when it is huge.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut num_writers = ((self.total_tasks as f64 * self.write_fraction).floor() as usize)
            .min(self.total_tasks);
        if self.write_fraction > 0.0 && num_writers == 0 && self.total_tasks > 0 {
            num_writers = 1;
        }
        let num_readers = self.total_tasks - num_writers;
        let too_many = || ConfigError::TooManyOperations {
            operations_per_task: self.operations_per_task,
            total_tasks: self.total_tasks,
        };
        let operations_per_reader = self
            .operations_per_task
            .checked_mul(num_writers.max(1))
            .ok_or_else(too_many)?;
        let total_writes = num_writers
            .checked_mul(self.operations_per_task)
            .ok_or_else(too_many)?;
        num_readers
            .checked_mul(operations_per_reader)
            .and_then(|total_reads| total_reads.checked_add(total_writes))
            .ok_or_else(too_many)?;
        Ok(WorkloadPlan {
            num_writers,
            num_readers,
            operations_per_writer: self.operations_per_task,
            operations_per_reader,
        })
    }
}

impl WorkloadPlan {
    pub fn total_tasks(&self) -> usize {
        self.num_writers + self.num_readers
    }

    pub fn total_writes(&self) -> usize {
        self.num_writers * self.operations_per_writer
    }

    pub fn total_reads(&self) -> usize {
        self.num_readers * self.operations_per_reader
    }
}
