use {
    crate::WorkloadReport,
    op_history::DumpError,
    std::{io, path::PathBuf},
};

/// Invalid or unreadable workload configuration. Always raised before any task starts.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unable to read properties from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("expected `key=value`, found {0:?}")]
    MalformedProperty(String),

    #[error("property {key:?} has invalid value {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("operations per task must be positive")]
    NoOperations,

    #[error("write fraction must be within [0, 1], found {0}")]
    WriteFractionOutOfRange(f64),

    #[error("{operations_per_task} operations per task over {total_tasks} tasks is too many")]
    TooManyOperations {
        operations_per_task: usize,
        total_tasks: usize,
    },
}

/// A task's log client could not be initialized. Only that task is affected.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unable to initialize log client: {0}")]
pub struct ClientInitError(pub String);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("append failed: {0}")]
pub struct AppendError(pub String);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("read failed: {0}")]
pub struct ReadError(pub String);

/// Why an operation was left without a response in the history.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Append(#[from] AppendError),

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Errors that stop a whole run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkloadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run finished but its history could not be written. The history is still available
    /// through `report`.
    #[error("{source}")]
    Dump {
        #[source]
        source: DumpError,
        report: Box<WorkloadReport>,
    },
}
