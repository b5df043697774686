use crate::{AppendError, ClientInitError, Properties, ReadError};

/// A client of the append-only log under test.
///
/// The driver builds one client per task and never shares it, so implementations need not be
/// `Send` or `Sync`. Every call may block for as long as the log service takes to answer.
pub trait LogClient {
    /// Binds the client to its configuration, which includes the task's identity under
    /// [`CLIENT_ID_KEY`](crate::CLIENT_ID_KEY).
    fn initialize(&mut self, properties: &Properties) -> Result<(), ClientInitError>;

    /// Durably appends `payload`, returning the sequence numbers the log assigned to it.
    fn append_entry(&mut self, payload: &str) -> Result<Vec<u64>, AppendError>;

    /// Returns the value stored at `index`.
    fn read_entry(&mut self, index: u64) -> Result<String, ReadError>;
}

/// Lets a client factory return a different client type for each task.
impl<C: LogClient + ?Sized> LogClient for Box<C> {
    fn initialize(&mut self, properties: &Properties) -> Result<(), ClientInitError> {
        (**self).initialize(properties)
    }

    fn append_entry(&mut self, payload: &str) -> Result<Vec<u64>, AppendError> {
        (**self).append_entry(payload)
    }

    fn read_entry(&mut self, index: u64) -> Result<String, ReadError> {
        (**self).read_entry(index)
    }
}
