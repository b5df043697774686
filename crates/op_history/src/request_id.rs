use {
    core::fmt::{Display, Formatter},
    std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Identifies one logical operation. Its invoke and response events share the same value.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequestId(u64);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<RequestId> for u64 {
    fn from(req_id: RequestId) -> Self {
        req_id.0
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        RequestId(value)
    }
}

/// Hands out [`RequestId`]s starting at 0, without gaps, from any number of threads.
///
/// Clones share the same counter, so an allocator can be cloned into each workload task.
#[derive(Clone, Debug, Default)]
pub struct RequestIdAllocator {
    next: Arc<AtomicU64>,
}

impl RequestIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids issued so far. Also the value the next call to [`Self::next`] returns.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> RequestId {
        RequestId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
