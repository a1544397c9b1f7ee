use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Shared, monotonically increasing render request counter.
///
/// Clones share the same counter. A render captures [`TaskEpoch::current`] when it starts and
/// is stale once the counter has moved on.
#[derive(Clone, Debug, Default)]
pub struct TaskEpoch(Arc<AtomicU64>);

impl TaskEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Mark every in-flight render as superseded. Returns the new epoch.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, captured: u64) -> bool {
        self.current() == captured
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/epoch.rs"]
mod tests;
