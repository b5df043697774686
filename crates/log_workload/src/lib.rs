//! This library drives concurrent writers and readers against an append-only log and records
//! what each of them observes, producing the history a linearizability checker consumes.
//!
//! # Running A Workload
//!
//! A [`WorkloadConfig`] says how many tasks to run, what share of them write, and how many
//! operations each performs. A [`WorkloadDriver`] spawns one thread per task; each task builds
//! its own [`LogClient`], then loops: take a request ID, record the invoke, call the log,
//! record the response. Once every task has joined, the driver returns a [`WorkloadReport`]
//! whose history can be written with [`op_history::HistorySerializer`].
//!
//! ```rust
//! use log_workload::{MemoryLog, Properties, WorkloadConfig, WorkloadDriver};
//!
//! let log = MemoryLog::new();
//! let driver = WorkloadDriver::new(WorkloadConfig::default(), Properties::new()).unwrap();
//! let report = driver.run(move |_actor| log.client());
//!
//! assert!(report.is_clean());
//! assert_eq!(report.plan.num_writers, 4);
//! assert_eq!(report.history.stats().write_invokes, 40);
//! assert_eq!(report.history.stats().read_invokes, 40);
//! ```
//!
//! # Failures
//!
//! A failed append or read is not dropped from the history: its invoke stays recorded with no
//! response, which a checker reads as an operation that may or may not have taken effect. The
//! task that saw the failure stops issuing operations, so every actor has at most one pending
//! operation. Sibling tasks carry on. See [`TaskOutcome`].

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod client;
mod config;
mod driver;
mod error;
mod memory;
mod payload;
mod properties;

pub use client::LogClient;
pub use config::{WorkloadConfig, WorkloadPlan, COUNT_KEY, RATIO_KEY, THREADS_KEY};
pub use driver::{
    Role, TaskOutcome, TaskReport, WorkloadDriver, WorkloadReport, WRITE_INDEX_PLACEHOLDER,
};
pub use error::{
    AppendError, ClientInitError, ConfigError, OperationError, ReadError, WorkloadError,
};
pub use memory::{MemoryLog, MemoryLogClient, STRICT_READS_KEY};
pub use payload::{parse_payload, write_payload};
pub use properties::{Properties, CLIENT_ID_KEY};
