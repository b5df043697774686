//! This library records what concurrent clients of a shared object observe, as an ordered
//! history of invoke and response events, and renders that history in the line-oriented
//! format consumed by linearizability checkers.
//!
//! # Recording
//!
//! Each logical operation gets a [`RequestId`] from a [`RequestIdAllocator`]. The caller then
//! records an invoke event, performs the operation, and records a response event with the
//! outcome. A [`HistoryRecorder`] serializes every append under one lock, so the resulting
//! [`History`] is a total order of events that reflects real time across all callers.
//!
//! An operation whose response is never recorded stays in the history as an invoke without a
//! response. Checkers treat such an operation as one that may or may not have taken effect.
//!
//! ```rust
//! use op_history::{HistoryRecorder, HistorySerializer, RequestIdAllocator};
//!
//! let ids = RequestIdAllocator::new();
//! let recorder = HistoryRecorder::new();
//!
//! let write = ids.next();
//! recorder.record_write_invoke(write, 0.into(), "00_00000");
//! recorder.record_write_response(write, 0.into(), 0, vec![1]);
//!
//! let read = ids.next();
//! let snapshot = recorder.record_read_invoke(read, 1.into());
//! assert_eq!(snapshot, 0);
//! recorder.record_read_response(read, 1.into(), "00_00000", 0);
//!
//! let text = HistorySerializer::default().render(&recorder.into_history()).unwrap();
//! assert_eq!(
//!     text,
//!     "inv write id=0 client=0 val=00_00000\n\
//!      res write id=0 client=0 idx=0 seq=[1]\n\
//!      inv read id=1 client=1\n\
//!      res read id=1 client=1 idx=0 val=00_00000\n"
//! );
//! ```
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` and `Deserialize` for records and enable
//!   [`HistoryFormat::JsonLines`].

#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]
#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod error;
mod history;
mod record;
mod recorder;
mod request_id;
mod serializer;

pub use error::{DumpError, HistoryError};
pub use history::{History, HistoryStats};
pub use record::{ActorId, HistoryRecord, OperationKind, Phase, UNSET_INDEX};
pub use recorder::HistoryRecorder;
pub use request_id::{RequestId, RequestIdAllocator};
pub use serializer::{HistoryFormat, HistorySerializer, DEFAULT_HISTORY_PATH};
