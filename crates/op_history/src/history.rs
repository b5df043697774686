use {
    crate::{
        ActorId, HistoryError, HistoryRecord, OperationKind, Phase, RequestId, UNSET_INDEX,
    },
    core::str::FromStr,
    std::collections::BTreeMap,
};

/// An immutable, ordered sequence of [`HistoryRecord`]s.
///
/// The order is the order in which a [`HistoryRecorder`](crate::HistoryRecorder) appended the
/// records, which is the real-time order of the events.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct History(Vec<HistoryRecord>);

/// Per phase and kind record counts for a [`History`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HistoryStats {
    pub write_invokes: usize,
    pub write_responses: usize,
    pub read_invokes: usize,
    pub read_responses: usize,
    /// Operations with an invoke but no response.
    pub incomplete: usize,
}

impl From<Vec<HistoryRecord>> for History {
    fn from(records: Vec<HistoryRecord>) -> Self {
        History(records)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl History {
    pub fn records(&self) -> &[HistoryRecord] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records produced by one actor, in order.
    pub fn for_actor(&self, actor_id: ActorId) -> impl Iterator<Item = &HistoryRecord> + '_ {
        self.0.iter().filter(move |r| r.actor_id() == actor_id)
    }

    /// Request IDs that were invoked but never received a response, in invocation order.
    pub fn incomplete(&self) -> Vec<RequestId> {
        let responded: std::collections::BTreeSet<_> = self
            .0
            .iter()
            .filter(|r| r.phase() == Phase::Response)
            .map(HistoryRecord::request_id)
            .collect();
        self.0
            .iter()
            .filter(|r| r.phase() == Phase::Invoke && !responded.contains(&r.request_id()))
            .map(HistoryRecord::request_id)
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats::default();
        for record in &self.0 {
            match (record.phase(), record.kind()) {
                (Phase::Invoke, OperationKind::Write) => stats.write_invokes += 1,
                (Phase::Response, OperationKind::Write) => stats.write_responses += 1,
                (Phase::Invoke, OperationKind::Read) => stats.read_invokes += 1,
                (Phase::Response, OperationKind::Read) => stats.read_responses += 1,
            }
        }
        stats.incomplete = self.incomplete().len();
        stats
    }

    /// Checks that the history is well formed: each request ID is invoked exactly once,
    /// responded to at most once and only after its invoke, and the response agrees with the
    /// invoke on actor and operation kind.
    pub fn validate(&self) -> Result<(), HistoryError> {
        let mut invoked: BTreeMap<RequestId, (ActorId, OperationKind, bool)> = BTreeMap::new();
        for record in &self.0 {
            let req_id = record.request_id();
            match record.phase() {
                Phase::Invoke => {
                    if invoked
                        .insert(req_id, (record.actor_id(), record.kind(), false))
                        .is_some()
                    {
                        return Err(HistoryError::DuplicateInvoke(req_id));
                    }
                }
                Phase::Response => {
                    let (actor_id, kind, responded) = invoked
                        .get_mut(&req_id)
                        .ok_or(HistoryError::ResponseWithoutInvoke(req_id))?;
                    if *responded {
                        return Err(HistoryError::DuplicateResponse(req_id));
                    }
                    if *actor_id != record.actor_id() || *kind != record.kind() {
                        return Err(HistoryError::MismatchedResponse(req_id));
                    }
                    *responded = true;
                }
            }
        }
        Ok(())
    }

    /// Parses the text rendering produced by [`HistorySerializer`](crate::HistorySerializer).
    /// Blank lines are skipped.
    ///
    /// Read invoke lines do not carry their snapshot index, so it is recomputed from the
    /// number of write invokes that precede each one, as the recorder computed it.
    pub fn parse(text: &str) -> Result<Self, HistoryError> {
        let mut last_write_index = UNSET_INDEX;
        let mut records = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let record: HistoryRecord = line.parse().map_err(|_| HistoryError::MalformedLine {
                line_number: i + 1,
                line: line.to_string(),
            })?;
            let record = match (record.phase(), record.kind()) {
                (Phase::Invoke, OperationKind::Write) => {
                    last_write_index += 1;
                    record
                }
                (Phase::Invoke, OperationKind::Read) => HistoryRecord::read_invoke(
                    record.request_id(),
                    record.actor_id(),
                    last_write_index,
                ),
                _ => record,
            };
            records.push(record);
        }
        Ok(History(records))
    }
}

impl FromStr for History {
    type Err = HistoryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        History::parse(text)
    }
}
