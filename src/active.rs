// active.rs
use std::sync::RwLock;

/// Single-slot holder for the id of the poll currently accepting votes.
///
/// Owned by the service instance rather than living in a static, so tests
/// run against isolated slots. Written only by the creation path; in-memory
/// only, so a restart leaves no poll active until a new one is created.
#[derive(Debug, Default)]
pub struct ActivePollSlot {
    current: RwLock<Option<i64>>,
}

impl ActivePollSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, poll_id: i64) {
        *self.current.write().expect("active poll slot poisoned") = Some(poll_id);
    }

    pub fn get(&self) -> Option<i64> {
        *self.current.read().expect("active poll slot poisoned")
    }
}
