use {
    crate::{HistoryError, RequestId},
    core::{
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

/// Index of a write invoke, and the snapshot index of a read invoked before any write.
pub const UNSET_INDEX: i64 = -1;

/// Identifies the workload task that produced an event. Stable for the duration of a run.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(usize);

impl Display for ActorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<ActorId> for usize {
    fn from(actor: ActorId) -> Self {
        actor.0
    }
}

impl From<usize> for ActorId {
    fn from(value: usize) -> Self {
        ActorId(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Phase {
    Invoke,
    Response,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Invoke => "inv",
            Phase::Response => "res",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperationKind {
    Write,
    Read,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Write => "write",
            OperationKind::Read => "read",
        }
    }
}

/// One half of an operation's lifecycle, as observed by the client that issued it.
///
/// Rendered with [`Display`] as a single line of the history file:
///
/// ```text
/// inv write id=<id> client=<actor> val=<payload>
/// res write id=<id> client=<actor> idx=<index> seq=[<n0>,<n1>,...]
/// inv read id=<id> client=<actor>
/// res read id=<id> client=<actor> idx=<index> val=<value>
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HistoryRecord {
    request_id: RequestId,
    actor_id: ActorId,
    phase: Phase,
    kind: OperationKind,
    payload: String,
    index: i64,
    sequence_numbers: Vec<u64>,
}

impl HistoryRecord {
    pub fn write_invoke(
        request_id: RequestId,
        actor_id: ActorId,
        payload: impl Into<String>,
    ) -> Self {
        HistoryRecord {
            request_id,
            actor_id,
            phase: Phase::Invoke,
            kind: OperationKind::Write,
            payload: payload.into(),
            index: UNSET_INDEX,
            sequence_numbers: Vec::new(),
        }
    }

    pub fn write_response(
        request_id: RequestId,
        actor_id: ActorId,
        index: i64,
        sequence_numbers: Vec<u64>,
    ) -> Self {
        HistoryRecord {
            request_id,
            actor_id,
            phase: Phase::Response,
            kind: OperationKind::Write,
            payload: String::new(),
            index,
            sequence_numbers,
        }
    }

    /// `snapshot` is the upper bound index visible when the read was issued.
    pub fn read_invoke(request_id: RequestId, actor_id: ActorId, snapshot: i64) -> Self {
        HistoryRecord {
            request_id,
            actor_id,
            phase: Phase::Invoke,
            kind: OperationKind::Read,
            payload: String::new(),
            index: snapshot,
            sequence_numbers: Vec::new(),
        }
    }

    pub fn read_response(
        request_id: RequestId,
        actor_id: ActorId,
        value: impl Into<String>,
        index: i64,
    ) -> Self {
        HistoryRecord {
            request_id,
            actor_id,
            phase: Phase::Response,
            kind: OperationKind::Read,
            payload: value.into(),
            index,
            sequence_numbers: Vec::new(),
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The written payload for a write invoke, the value read for a read response, and empty
    /// otherwise.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The snapshot index for a read invoke, the index read for a read response, the reported
    /// position for a write response, and [`UNSET_INDEX`] for a write invoke.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn sequence_numbers(&self) -> &[u64] {
        &self.sequence_numbers
    }
}

impl Display for HistoryRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} {} id={} client={}",
            self.phase.as_str(),
            self.kind.as_str(),
            self.request_id,
            self.actor_id
        )?;
        match (self.phase, self.kind) {
            (Phase::Invoke, OperationKind::Write) => write!(f, " val={}", self.payload),
            (Phase::Response, OperationKind::Write) => {
                write!(f, " idx={} seq=[", self.index)?;
                let mut iter = self.sequence_numbers.iter();
                if let Some(first) = iter.next() {
                    write!(f, "{first}")?;
                    for n in iter {
                        write!(f, ",{n}")?;
                    }
                }
                f.write_str("]")
            }
            (Phase::Invoke, OperationKind::Read) => Ok(()),
            (Phase::Response, OperationKind::Read) => {
                write!(f, " idx={} val={}", self.index, self.payload)
            }
        }
    }
}

/// Splits `key=<value> <rest>` into `(value, rest)`.
fn field<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let line = line.strip_prefix(key)?.strip_prefix('=')?;
    Some(line.split_once(' ').unwrap_or((line, "")))
}

fn sequence_numbers(list: &str) -> Option<Vec<u64>> {
    let list = list.strip_prefix('[')?.strip_suffix(']')?;
    if list.is_empty() {
        return Some(Vec::new());
    }
    list.split(',').map(|n| n.parse().ok()).collect()
}

impl FromStr for HistoryRecord {
    type Err = HistoryError;

    /// Parses one line of the history file. The inverse of [`Display`], except that a read
    /// invoke's snapshot is not part of its line and parses as [`UNSET_INDEX`].
    /// [`History::parse`](crate::History::parse) restores it from the preceding records.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parse = || -> Option<HistoryRecord> {
            let (phase, rest) = line.split_once(' ')?;
            let (kind, rest) = rest.split_once(' ')?;
            let (request_id, rest) = field(rest, "id")?;
            let request_id = RequestId::from(request_id.parse::<u64>().ok()?);
            match (phase, kind) {
                ("inv", "write") => {
                    let (actor, rest) = rest.split_once(' ')?;
                    let actor_id =
                        ActorId::from(actor.strip_prefix("client=")?.parse::<usize>().ok()?);
                    let payload = rest.strip_prefix("val=")?;
                    Some(HistoryRecord::write_invoke(request_id, actor_id, payload))
                }
                ("res", "write") => {
                    let (actor, rest) = field(rest, "client")?;
                    let (index, rest) = field(rest, "idx")?;
                    let (seq, rest) = field(rest, "seq")?;
                    if !rest.is_empty() {
                        return None;
                    }
                    Some(HistoryRecord::write_response(
                        request_id,
                        ActorId::from(actor.parse::<usize>().ok()?),
                        index.parse().ok()?,
                        sequence_numbers(seq)?,
                    ))
                }
                ("inv", "read") => {
                    let (actor, rest) = field(rest, "client")?;
                    if !rest.is_empty() {
                        return None;
                    }
                    Some(HistoryRecord::read_invoke(
                        request_id,
                        ActorId::from(actor.parse::<usize>().ok()?),
                        UNSET_INDEX,
                    ))
                }
                ("res", "read") => {
                    let (actor, rest) = field(rest, "client")?;
                    let (index, rest) = field(rest, "idx")?;
                    let value = rest.strip_prefix("val=")?;
                    Some(HistoryRecord::read_response(
                        request_id,
                        ActorId::from(actor.parse::<usize>().ok()?),
                        value,
                        index.parse().ok()?,
                    ))
                }
                _ => None,
            }
        };
        parse().ok_or_else(|| HistoryError::Malformed(line.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_each_line_shape() {
        let id = RequestId::from(7);
        let actor = ActorId::from(3);
        assert_eq!(
            HistoryRecord::write_invoke(id, actor, "03_00001").to_string(),
            "inv write id=7 client=3 val=03_00001"
        );
        assert_eq!(
            HistoryRecord::write_response(id, actor, 0, vec![4, 5, 6]).to_string(),
            "res write id=7 client=3 idx=0 seq=[4,5,6]"
        );
        assert_eq!(
            HistoryRecord::read_invoke(id, actor, 5).to_string(),
            "inv read id=7 client=3"
        );
        assert_eq!(
            HistoryRecord::read_response(id, actor, "00_00000", 12).to_string(),
            "res read id=7 client=3 idx=12 val=00_00000"
        );
    }

    #[test]
    fn renders_empty_sequence_without_separators() {
        let record = HistoryRecord::write_response(1.into(), 0.into(), 0, Vec::new());
        assert_eq!(record.to_string(), "res write id=1 client=0 idx=0 seq=[]");
        let record = HistoryRecord::write_response(1.into(), 0.into(), 0, vec![9]);
        assert_eq!(record.to_string(), "res write id=1 client=0 idx=0 seq=[9]");
    }

    #[test]
    fn renders_empty_values() {
        assert_eq!(
            HistoryRecord::read_response(2.into(), 1.into(), "", -1).to_string(),
            "res read id=2 client=1 idx=-1 val="
        );
    }

    #[test]
    fn parses_rendered_lines() {
        for record in [
            HistoryRecord::write_invoke(0.into(), 1.into(), "01_00000"),
            HistoryRecord::write_response(0.into(), 1.into(), 0, vec![10, 11]),
            HistoryRecord::write_response(1.into(), 1.into(), 0, vec![]),
            HistoryRecord::read_invoke(2.into(), 4.into(), UNSET_INDEX),
            HistoryRecord::read_response(2.into(), 4.into(), "value with spaces", 3),
        ] {
            assert_eq!(record.to_string().parse::<HistoryRecord>(), Ok(record));
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "inv",
            "inv write id=x client=0 val=a",
            "res write id=1 client=0 idx=0 seq=[1,]",
            "res write id=1 client=0 idx=0",
            "inv read id=1 client=0 extra",
            "upd write id=1 client=0 val=a",
        ] {
            assert_eq!(
                line.parse::<HistoryRecord>(),
                Err(HistoryError::Malformed(line.to_string())),
                "{line:?}"
            );
        }
    }
}
