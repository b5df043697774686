//! An in-process log service, so the driver can run without an external deployment.

use {
    crate::{
        AppendError, ClientInitError, ConfigError, LogClient, Properties, ReadError,
        CLIENT_ID_KEY,
    },
    std::{
        collections::BTreeSet,
        sync::{Arc, Mutex, MutexGuard, PoisonError},
    },
    tracing::debug,
};

/// When `true`, reading a position that has not been written fails instead of returning an
/// empty value.
pub const STRICT_READS_KEY: &str = "memory_log.strict_reads";

#[derive(Default)]
struct MemoryLogState {
    entries: Vec<String>,
    rejected_clients: BTreeSet<String>,
    failing_payloads: BTreeSet<String>,
    strict_reads: bool,
}

/// A shared, linearizable append-only log. Clones refer to the same log.
///
/// Faults can be injected to exercise how the driver records failed operations.
#[derive(Clone, Default)]
pub struct MemoryLog {
    state: Arc<Mutex<MemoryLogState>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`STRICT_READS_KEY`].
    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        let log = MemoryLog::new();
        log.lock().strict_reads = properties.parse_or(STRICT_READS_KEY, false)?;
        Ok(log)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn client(&self) -> MemoryLogClient {
        MemoryLogClient {
            log: self.clone(),
            client_id: None,
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes `initialize` fail for the client with this `dur_log.client_id`.
    pub fn reject_client(&self, client_id: impl Into<String>) {
        self.lock().rejected_clients.insert(client_id.into());
    }

    /// Makes the append of exactly this payload fail.
    pub fn fail_append(&self, payload: impl Into<String>) {
        self.lock().failing_payloads.insert(payload.into());
    }

    pub fn set_strict_reads(&self, strict_reads: bool) {
        self.lock().strict_reads = strict_reads;
    }
}

/// A [`LogClient`] for a [`MemoryLog`]. Each entry's sequence number is its position.
pub struct MemoryLogClient {
    log: MemoryLog,
    client_id: Option<String>,
}

impl MemoryLogClient {
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

impl LogClient for MemoryLogClient {
    fn initialize(&mut self, properties: &Properties) -> Result<(), ClientInitError> {
        let client_id = properties
            .get_property(CLIENT_ID_KEY)
            .ok_or_else(|| ClientInitError(format!("missing {CLIENT_ID_KEY}")))?;
        if self.log.lock().rejected_clients.contains(client_id) {
            return Err(ClientInitError(format!("client {client_id} rejected")));
        }
        debug!(client_id, "Memory log client initialized.");
        self.client_id = Some(client_id.to_string());
        Ok(())
    }

    fn append_entry(&mut self, payload: &str) -> Result<Vec<u64>, AppendError> {
        if self.client_id.is_none() {
            return Err(AppendError("client not initialized".to_string()));
        }
        let mut state = self.log.lock();
        if state.failing_payloads.contains(payload) {
            return Err(AppendError(format!("injected failure for {payload:?}")));
        }
        let position = state.entries.len() as u64;
        state.entries.push(payload.to_string());
        Ok(vec![position])
    }

    fn read_entry(&mut self, index: u64) -> Result<String, ReadError> {
        if self.client_id.is_none() {
            return Err(ReadError("client not initialized".to_string()));
        }
        let state = self.log.lock();
        let entry = usize::try_from(index)
            .ok()
            .and_then(|i| state.entries.get(i));
        match entry {
            Some(value) => Ok(value.clone()),
            None if state.strict_reads => Err(ReadError(format!("no entry at {index}"))),
            None => Ok(String::new()),
        }
    }
}
