use {
    crate::{record::UNSET_INDEX, ActorId, History, HistoryRecord, RequestId},
    std::sync::{Mutex, MutexGuard, PoisonError},
    tracing::trace,
};

struct RecorderState {
    records: Vec<HistoryRecord>,
    last_write_index: i64,
}

/// Thread-safe, append-only log of invoke/response events.
///
/// All four `record_*` methods run under a single lock, so the order in which records are
/// appended is a total order over every event from every task. That order is the real-time
/// order a linearizability checker relies on.
///
/// The recorder also tracks the "last known write index": it starts at `-1` and advances by
/// one each time a write is *invoked* (whether or not the write later succeeds). A read invoke
/// is handed the value current at the moment it is recorded.
pub struct HistoryRecorder {
    state: Mutex<RecorderState>,
}

impl Default for HistoryRecorder {
    fn default() -> Self {
        HistoryRecorder {
            state: Mutex::new(RecorderState {
                records: Vec::new(),
                last_write_index: UNSET_INDEX,
            }),
        }
    }
}

impl HistoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    // Records are only ever pushed, so a panic while the lock is held cannot leave a
    // half-applied update behind.
    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_write_invoke(
        &self,
        request_id: RequestId,
        actor_id: ActorId,
        payload: impl Into<String>,
    ) {
        let mut state = self.lock();
        state
            .records
            .push(HistoryRecord::write_invoke(request_id, actor_id, payload));
        state.last_write_index += 1;
        trace!(%request_id, %actor_id, last_write_index = state.last_write_index, "inv write");
    }

    pub fn record_write_response(
        &self,
        request_id: RequestId,
        actor_id: ActorId,
        index: i64,
        sequence_numbers: Vec<u64>,
    ) {
        let mut state = self.lock();
        state.records.push(HistoryRecord::write_response(
            request_id,
            actor_id,
            index,
            sequence_numbers,
        ));
        trace!(%request_id, %actor_id, index, "res write");
    }

    /// Returns the snapshot index: the last known write index at the moment of the invoke. The
    /// appended record carries the same value as its index.
    pub fn record_read_invoke(&self, request_id: RequestId, actor_id: ActorId) -> i64 {
        let mut state = self.lock();
        let snapshot = state.last_write_index;
        state
            .records
            .push(HistoryRecord::read_invoke(request_id, actor_id, snapshot));
        trace!(%request_id, %actor_id, snapshot, "inv read");
        snapshot
    }

    pub fn record_read_response(
        &self,
        request_id: RequestId,
        actor_id: ActorId,
        value: impl Into<String>,
        index: i64,
    ) {
        let mut state = self.lock();
        state
            .records
            .push(HistoryRecord::read_response(request_id, actor_id, value, index));
        trace!(%request_id, %actor_id, index, "res read");
    }

    pub fn last_write_index(&self) -> i64 {
        self.lock().last_write_index
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the records appended so far.
    pub fn snapshot(&self) -> History {
        History::from(self.lock().records.clone())
    }

    pub fn into_history(self) -> History {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        History::from(state.records)
    }
}
